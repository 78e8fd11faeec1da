#![no_main]

use libfuzzer_sys::fuzz_target;
use peppol_billing::Pipeline;

fuzz_target!(|data: &[u8]| {
    // The inbound gate must refuse arbitrary bytes gracefully; the rule
    // catalog runs on whatever parses.
    let pipeline = Pipeline::standard();
    let _ = pipeline.accept(data);
});
