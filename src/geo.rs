//! Area-of-interest validation. Reading the geometry itself is left to the
//! search client; this only decides whether an input is usable.
use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

pub const AOI_EXTENSIONS: [&str; 5] = ["geojson", "json", "kml", "gml", "shp"];

static WKT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(POINT|LINESTRING|POLYGON|MULTIPOINT|MULTILINESTRING|MULTIPOLYGON)\s*(Z\s*)?(\(.*\))$",
    )
    .expect("valid regex")
});

static COORDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\d.,()+\-eE]+$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aoi {
    File(PathBuf),
    Wkt(String),
}

impl fmt::Display for Aoi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Wkt(w) => f.write_str(w),
        }
    }
}

pub trait GeometryValidator {
    fn validate(&self, input: &str) -> Result<Aoi, ValidationError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AoiValidator;

fn has_aoi_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AOI_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn balanced(s: &str) -> bool {
    let mut depth: i32 = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Upper-cases the geometry keyword and collapses runs of whitespace.
fn normalize_wkt(input: &str) -> Option<String> {
    let caps = WKT_RE.captures(input)?;
    let body = &caps[3];
    if !balanced(body) || !COORDS_RE.is_match(body) || !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let body = collapsed.replace("( ", "(").replace(" )", ")").replace(" ,", ",");
    let z = if caps.get(2).is_some() { " Z" } else { "" };
    Some(format!("{}{} {}", caps[1].to_ascii_uppercase(), z, body))
}

impl GeometryValidator for AoiValidator {
    fn validate(&self, input: &str) -> Result<Aoi, ValidationError> {
        let input = input.trim().trim_matches(|c: char| c == '\'' || c == '"');
        let path = Path::new(input);

        if path.is_file() {
            if !has_aoi_extension(path) {
                return Err(ValidationError::UnsupportedAoiFile(input.to_string()));
            }
            return Ok(Aoi::File(path.to_path_buf()));
        }
        if has_aoi_extension(path) {
            return Err(ValidationError::MissingAoiFile(input.to_string()));
        }
        normalize_wkt(input)
            .map(Aoi::Wkt)
            .ok_or_else(|| ValidationError::InvalidWkt(input.to_string()))
    }
}
