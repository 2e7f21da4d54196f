//! Coordinate reference system handles
//!
//! Only the identifier is carried; resolving it to an EPSG code is all the
//! dialect needs to register an SRID.

const EPSG_PREFIXES: [&str; 4] = [
    "EPSG:",
    "urn:ogc:def:crs:EPSG::",
    "urn:x-ogc:def:crs:EPSG::",
    "http://www.opengis.net/def/crs/EPSG/0/",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateReferenceSystem {
    identifier: String,
}

impl CoordinateReferenceSystem {
    pub fn new(identifier: impl Into<String>) -> Self {
        CoordinateReferenceSystem { identifier: identifier.into() }
    }

    /// Shorthand for `EPSG:<code>`
    pub fn epsg(code: i32) -> Self {
        CoordinateReferenceSystem::new(format!("EPSG:{}", code))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// EPSG code named by the identifier, if it names one
    pub fn lookup_epsg_code(&self) -> Option<i32> {
        let id = self.identifier.trim();
        if let Ok(code) = id.parse::<i32>() {
            return Some(code);
        }
        EPSG_PREFIXES.iter().find_map(|prefix| {
            let head = id.get(..prefix.len())?;
            if head.eq_ignore_ascii_case(prefix) {
                id[prefix.len()..].trim().parse().ok()
            } else {
                None
            }
        })
    }
}
