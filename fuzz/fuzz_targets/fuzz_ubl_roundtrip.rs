#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse → serialize → parse must not panic at any step.
        if let Ok(invoice) = peppol_billing::ubl::from_xml(s) {
            if let Ok(xml2) = peppol_billing::ubl::to_xml(&invoice) {
                let _ = peppol_billing::ubl::from_xml(&xml2);
            }
        }
    }
});
