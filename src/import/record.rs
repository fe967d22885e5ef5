//! Tree-structured record for one physical unit and its sub-units

use serde::Serialize;

/// Domain token marking a serial that was recorded as a vendor lookup URL.
const VENDOR_URL_TOKEN: &str = "dell.com";

/// One imported unit: a device, or a sub-component of one.
///
/// A record with a non-empty `children` list is a parent; children are
/// always leaves. The forest is built once during row classification and
/// never mutated afterward beyond appending children to their parent.
///
/// Serializing a record yields the nested container form used by the
/// skipped-record report.
#[derive(Clone, Debug, Serialize)]
pub struct Record {
    pub serial: String,
    pub asset_tag: String,
    pub make: String,
    pub model: String,
    pub device_type: String,
    pub children: Vec<Record>,
}

impl Record {
    pub fn new(
        serial: &str,
        asset_tag: &str,
        make: &str,
        model: &str,
        device_type: &str,
    ) -> Self {
        Self {
            serial: normalize_serial(serial),
            asset_tag: asset_tag.to_string(),
            make: make.to_string(),
            model: model.to_string(),
            device_type: device_type.to_string(),
            children: Vec::new(),
        }
    }
}

/// Rewrite serials recorded as vendor lookup links to the lookup code.
///
/// Some serials arrive as `https://qrl.dell.com/H6FND42`; the code is the
/// final path segment and never itself contains a `/`. Applies uniformly to
/// parents and children.
pub fn normalize_serial(raw: &str) -> String {
    let serial = raw.trim();
    if serial.contains(VENDOR_URL_TOKEN) {
        serial
            .rsplit('/')
            .next()
            .unwrap_or(serial)
            .to_string()
    } else {
        serial.to_string()
    }
}

/// Map a device type to the one-character disposition code.
pub fn type_code(device_type: &str) -> char {
    match device_type {
        "Hard Drive" => 'H',
        "Network" => 'N',
        "Tape" => 'T',
        _ => '0',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_url_serial_keeps_lookup_code() {
        assert_eq!(normalize_serial("https://qrl.dell.com/H6FND42"), "H6FND42");
    }

    #[test]
    fn test_plain_serial_unchanged() {
        assert_eq!(normalize_serial("SN-001"), "SN-001");
        assert_eq!(normalize_serial("  SN-001  "), "SN-001");
    }

    #[test]
    fn test_record_normalizes_serial_on_construction() {
        let record = Record::new("https://qrl.dell.com/H6FND42", "T1", "Dell", "R740", "Server");
        assert_eq!(record.serial, "H6FND42");
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(type_code("Hard Drive"), 'H');
        assert_eq!(type_code("Network"), 'N');
        assert_eq!(type_code("Tape"), 'T');
        assert_eq!(type_code("Laptop"), '0');
        assert_eq!(type_code(""), '0');
    }

    #[test]
    fn test_record_serializes_to_nested_containers() {
        let mut parent = Record::new("S1", "T1", "Dell", "Latitude", "Laptop");
        parent
            .children
            .push(Record::new("S2", "T2", "Dell", "Latitude", "Hard Drive"));

        let value = serde_json::to_value(&parent).unwrap();
        assert_eq!(value["serial"], "S1");
        assert_eq!(value["children"][0]["serial"], "S2");
        assert_eq!(value["children"][0]["children"], serde_json::json!([]));
    }
}
