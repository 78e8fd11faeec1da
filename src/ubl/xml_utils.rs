use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rust_decimal::Decimal;

use crate::core::{MonetaryAmount, StructuralError};

pub type XmlResult = Result<String, StructuralError>;

fn xml_io(e: std::io::Error) -> StructuralError {
    StructuralError::Xml(format!("write error: {e}"))
}

/// Thin, indenting wrapper over the quick-xml event writer.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for XmlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlWriter").finish_non_exhaustive()
    }
}

impl XmlWriter {
    pub fn new() -> Result<Self, StructuralError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, StructuralError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|_| StructuralError::Encoding)
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, StructuralError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, StructuralError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, StructuralError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, StructuralError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, StructuralError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write a monetary amount with its currencyID attribute, rendered with
    /// exactly 2 fractional digits. An amount that cannot be stated in
    /// 2 fractional digits is a data-integrity defect and aborts the write.
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: &MonetaryAmount,
        path: &str,
    ) -> Result<&mut Self, StructuralError> {
        if !amount.has_standard_scale() {
            return Err(StructuralError::AmountScale {
                path: path.to_string(),
                value: amount.value.to_string(),
            });
        }
        self.text_element_with_attrs(
            name,
            &format_decimal(amount.value),
            &[("currencyID", amount.currency.as_str())],
        )
    }

    /// Write a unit price with its currencyID attribute. Prices keep their
    /// full precision (at least 2 fractional digits, more when present).
    pub fn price_element(
        &mut self,
        name: &str,
        amount: &MonetaryAmount,
    ) -> Result<&mut Self, StructuralError> {
        self.text_element_with_attrs(
            name,
            &format_decimal(amount.value),
            &[("currencyID", amount.currency.as_str())],
        )
    }

    /// Write a quantity with its unitCode attribute.
    pub fn quantity_element(
        &mut self,
        name: &str,
        quantity: Decimal,
        unit: &str,
    ) -> Result<&mut Self, StructuralError> {
        self.text_element_with_attrs(name, &format_decimal(quantity), &[("unitCode", unit)])
    }
}

/// Format a Decimal for XML output with at least 2 decimal places,
/// keeping further significant digits.
pub fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    if let Some(dot_pos) = s.find('.') {
        let decimals = s.len() - dot_pos - 1;
        if decimals < 2 {
            format!("{s}{}", "0".repeat(2 - decimals))
        } else {
            s
        }
    } else {
        format!("{s}.00")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn format_decimal_cases() {
        assert_eq!(format_decimal(dec!(100)), "100.00");
        assert_eq!(format_decimal(dec!(1500.0)), "1500.00");
        assert_eq!(format_decimal(dec!(49.90)), "49.90");
        assert_eq!(format_decimal(dec!(1833.48)), "1833.48");
        assert_eq!(format_decimal(dec!(0.005)), "0.005");
        assert_eq!(format_decimal(dec!(-3.5)), "-3.50");
    }

    #[test]
    fn amount_element_rejects_three_fractional_digits() {
        let mut w = XmlWriter::new().unwrap();
        let err = w
            .amount_element(
                "cbc:LineExtensionAmount",
                &MonetaryAmount::new(dec!(10.005), "EUR"),
                "Invoice.InvoiceLine[0].LineExtensionAmount",
            )
            .unwrap_err();
        assert!(matches!(err, StructuralError::AmountScale { .. }));
    }

    #[test]
    fn amount_element_accepts_trailing_zero_scale() {
        // 10.500 normalizes to 10.5; the stored scale does not matter.
        let mut w = XmlWriter::new().unwrap();
        w.amount_element(
            "cbc:PayableAmount",
            &MonetaryAmount::new(dec!(10.500), "EUR"),
            "Invoice.LegalMonetaryTotal.PayableAmount",
        )
        .unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.contains(r#"<cbc:PayableAmount currencyID="EUR">10.50</cbc:PayableAmount>"#));
    }
}
