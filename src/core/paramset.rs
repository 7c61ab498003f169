//! Configuration property tree.
//!
//! A **ParamSet** holds named items; each item is a raw scalar (kept as
//! a string and parsed on lookup), a sequence, or a nested ParamSet.
//! Lookups are typed: `find_one("num_vertices", 3)` parses the item as
//! the type of its default and falls back to the default (with a
//! warning) when the item is missing or cannot be parsed.
//!
//! Scene descriptions are read from JSON:
//!
//! ```rust
//! use rs_mlt::core::paramset::ParamSet;
//!
//!     let json = serde_json::json!({
//!         "renderer": { "type": "bdptfixed", "num_vertices": 3 }
//!     });
//!     let params = ParamSet::from_json("scene", &json);
//!     let renderer = params.child("renderer").unwrap();
//!     assert_eq!(renderer.find_one("num_vertices", 0_usize), 3);
//!     assert_eq!(renderer.find_one("num_mutations", 10_u64), 10);
//! ```

// std
use std::cell::Cell;
use std::fmt::Debug;
use std::fs;
use std::path::Path;
// others
use log::warn;
use serde_json::Value;
use thiserror::Error;
// pbrt
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::pbrt::{Float, Spectrum};

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("cannot read configuration file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration file {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration root of {0} must be a map")]
    NotAMap(String),
}

#[derive(Debug, Clone)]
pub enum ParamValue {
    Scalar(String),
    Sequence(Vec<ParamValue>),
    Map(ParamSet),
}

#[derive(Debug, Clone)]
pub struct ParamSetItem {
    pub name: String,
    pub value: ParamValue,
    looked_up: Cell<bool>,
}

impl ParamSetItem {
    pub fn new(name: &str, value: ParamValue) -> Self {
        ParamSetItem {
            name: name.to_string(),
            value,
            looked_up: Cell::new(false),
        }
    }
}

/// Types that can be read from a configuration value.
pub trait FromParam: Sized {
    fn from_param(value: &ParamValue) -> Option<Self>;
}

macro_rules! from_param_scalar {
    ($($t:ty),*) => {
        $(
            impl FromParam for $t {
                fn from_param(value: &ParamValue) -> Option<Self> {
                    match value {
                        ParamValue::Scalar(s) => s.trim().parse::<$t>().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_param_scalar!(f32, f64, i32, i64, u32, u64, usize, bool);

impl FromParam for String {
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Scalar(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// A list of floats, either as a sequence or as a whitespace separated
/// string.
impl FromParam for Vec<Float> {
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Scalar(s) => s
                .split_whitespace()
                .map(|v| v.parse::<Float>().ok())
                .collect(),
            ParamValue::Sequence(values) => values.iter().map(Float::from_param).collect(),
            ParamValue::Map(_) => None,
        }
    }
}

fn triple(value: &ParamValue) -> Option<[Float; 3]> {
    let values: Vec<Float> = Vec::<Float>::from_param(value)?;
    if values.len() != 3 {
        return None;
    }
    Some([values[0], values[1], values[2]])
}

impl FromParam for Vector3f {
    fn from_param(value: &ParamValue) -> Option<Self> {
        triple(value).map(|v| Vector3f::new(v[0], v[1], v[2]))
    }
}

impl FromParam for Point3f {
    fn from_param(value: &ParamValue) -> Option<Self> {
        triple(value).map(|v| Point3f::new(v[0], v[1], v[2]))
    }
}

/// RGB triple, or a single value for a gray spectrum.
impl FromParam for Spectrum {
    fn from_param(value: &ParamValue) -> Option<Self> {
        if let Some(v) = triple(value) {
            return Some(Spectrum::from_rgb(&v));
        }
        Float::from_param(value).map(Spectrum::new)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    pub key_word: String,
    pub items: Vec<ParamSetItem>,
}

impl ParamSet {
    pub fn new(key_word: &str) -> Self {
        ParamSet {
            key_word: key_word.to_string(),
            items: Vec::new(),
        }
    }
    pub fn from_json(key_word: &str, value: &Value) -> ParamSet {
        let mut params = ParamSet::new(key_word);
        if let Value::Object(map) = value {
            for (name, v) in map {
                params
                    .items
                    .push(ParamSetItem::new(name, ParamSet::json_value(name, v)));
            }
        }
        params
    }
    fn json_value(name: &str, value: &Value) -> ParamValue {
        match value {
            Value::Null => ParamValue::Scalar(String::new()),
            Value::Bool(b) => ParamValue::Scalar(b.to_string()),
            Value::Number(n) => ParamValue::Scalar(n.to_string()),
            Value::String(s) => ParamValue::Scalar(s.clone()),
            Value::Array(values) => ParamValue::Sequence(
                values
                    .iter()
                    .map(|v| ParamSet::json_value(name, v))
                    .collect(),
            ),
            Value::Object(_) => ParamValue::Map(ParamSet::from_json(name, value)),
        }
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ParamSet, ParamError> {
        let display = path.as_ref().display().to_string();
        let text = fs::read_to_string(&path).map_err(|source| ParamError::Io {
            path: display.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| ParamError::Json {
            path: display.clone(),
            source,
        })?;
        if !value.is_object() {
            return Err(ParamError::NotAMap(display));
        }
        Ok(ParamSet::from_json(&display, &value))
    }
    pub fn add_scalar<T: ToString>(&mut self, name: &str, value: T) {
        self.erase(name);
        self.items
            .push(ParamSetItem::new(name, ParamValue::Scalar(value.to_string())));
    }
    pub fn add_floats(&mut self, name: &str, values: &[Float]) {
        self.erase(name);
        let values = values
            .iter()
            .map(|v| ParamValue::Scalar(v.to_string()))
            .collect();
        self.items
            .push(ParamSetItem::new(name, ParamValue::Sequence(values)));
    }
    pub fn add_child(&mut self, name: &str, mut child: ParamSet) {
        self.erase(name);
        child.key_word = name.to_string();
        self.items.push(ParamSetItem::new(name, ParamValue::Map(child)));
    }
    pub fn add_children(&mut self, name: &str, children: Vec<ParamSet>) {
        self.erase(name);
        let values = children.into_iter().map(ParamValue::Map).collect();
        self.items
            .push(ParamSetItem::new(name, ParamValue::Sequence(values)));
    }
    pub fn erase(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.name != name);
        before != self.items.len()
    }
    fn find(&self, name: &str) -> Option<&ParamSetItem> {
        let item = self.items.iter().find(|item| item.name == name)?;
        item.looked_up.set(true);
        Some(item)
    }
    pub fn has(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }
    /// Typed lookup falling back to `d` when the item is missing or
    /// malformed.
    pub fn find_one<T: FromParam + Debug>(&self, name: &str, d: T) -> T {
        match self.find(name) {
            None => {
                warn!(
                    "Missing '{}' in '{}', using default value {:?}",
                    name, self.key_word, d
                );
                d
            }
            Some(item) => match T::from_param(&item.value) {
                Some(v) => v,
                None => {
                    warn!(
                        "Invalid value for '{}' in '{}', using default value {:?}",
                        name, self.key_word, d
                    );
                    d
                }
            },
        }
    }
    /// Like `find_one` but without a fallback; missing values are the
    /// caller's problem, malformed ones are reported here.
    pub fn find_required<T: FromParam>(&self, name: &str) -> Option<T> {
        let item = self.find(name)?;
        let v = T::from_param(&item.value);
        if v.is_none() {
            warn!("Invalid value for '{}' in '{}'", name, self.key_word);
        }
        v
    }
    /// Typed lookup for optional items: silent when missing.
    pub fn find_optional<T: FromParam>(&self, name: &str) -> Option<T> {
        if !self.has(name) {
            return None;
        }
        self.find_required(name)
    }
    pub fn child(&self, name: &str) -> Option<&ParamSet> {
        match self.find(name) {
            Some(ParamSetItem {
                value: ParamValue::Map(child),
                ..
            }) => Some(child),
            _ => None,
        }
    }
    /// Nested maps stored as a sequence under `name`.
    pub fn children(&self, name: &str) -> Vec<&ParamSet> {
        match self.find(name) {
            Some(ParamSetItem {
                value: ParamValue::Sequence(values),
                ..
            }) => values
                .iter()
                .filter_map(|v| match v {
                    ParamValue::Map(child) => Some(child),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
    pub fn report_unused(&self) {
        for item in &self.items {
            if !item.looked_up.get() {
                warn!("Parameter '{}' in '{}' not used", item.name, self.key_word);
                continue;
            }
            match &item.value {
                ParamValue::Map(child) => child.report_unused(),
                ParamValue::Sequence(values) => {
                    for v in values {
                        if let ParamValue::Map(child) = v {
                            child.report_unused();
                        }
                    }
                }
                ParamValue::Scalar(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn typed_lookups_fall_back_to_defaults() {
        let mut params = ParamSet::new("renderer");
        params.add_scalar("num_vertices", 4);
        params.add_scalar("num_mutations", "lots");
        assert_eq!(params.find_one("num_vertices", 3_usize), 4);
        assert_eq!(params.find_one("num_mutations", 7_u64), 7);
        assert_eq!(params.find_one("missing", 0.5 as Float), 0.5);
        assert_eq!(params.find_required::<u64>("num_mutations"), None);
        assert_eq!(params.find_required::<usize>("num_vertices"), Some(4));
        assert_eq!(params.find_optional::<usize>("absent"), None);
    }

    #[test]
    fn vectors_parse_from_sequences_and_strings() {
        let params = ParamSet::from_json(
            "camera",
            &json!({ "eye": [0, 1, 2.5], "up": "0 1 0", "R": 0.5, "bad": [1, 2] }),
        );
        let eye: Point3f = params.find_one("eye", Point3f::default());
        assert_eq!(eye, Point3f::new(0.0, 1.0, 2.5));
        let up: Vector3f = params.find_one("up", Vector3f::default());
        assert_eq!(up, Vector3f::new(0.0, 1.0, 0.0));
        let r: Spectrum = params.find_one("R", Spectrum::default());
        assert_eq!(r, Spectrum::new(0.5));
        let bad: Vector3f = params.find_one("bad", Vector3f::new(9.0, 9.0, 9.0));
        assert_eq!(bad, Vector3f::new(9.0, 9.0, 9.0));
    }

    #[test]
    fn nested_maps_and_sequences() {
        let params = ParamSet::from_json(
            "scene",
            &json!({
                "film": { "width": 16 },
                "primitives": [ { "shape": { "type": "quad" } }, { "shape": { "type": "sphere" } } ]
            }),
        );
        assert_eq!(params.child("film").unwrap().find_one("width", 0_u32), 16);
        let prims = params.children("primitives");
        assert_eq!(prims.len(), 2);
        let kind: String = prims[1].child("shape").unwrap().find_one("type", String::new());
        assert_eq!(kind, "sphere");
        assert!(params.child("primitives").is_none());
    }

    #[test]
    fn reads_json_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"renderer\": {{ \"type\": \"mltfixed\" }} }}").unwrap();
        let params = ParamSet::from_file(file.path()).unwrap();
        let kind: String = params
            .child("renderer")
            .unwrap()
            .find_one("type", String::new());
        assert_eq!(kind, "mltfixed");
        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "[1, 2").unwrap();
        assert!(matches!(
            ParamSet::from_file(broken.path()),
            Err(ParamError::Json { .. })
        ));
    }
}
