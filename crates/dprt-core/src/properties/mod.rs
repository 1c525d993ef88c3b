//! Property lookup used to steer reductions.
//!
//! The engine never talks to a property backend directly. It goes through
//! [`PropertyBindings`], a table of four independently replaceable lookup
//! slots (string, integer, double, boolean). The table is normally filled
//! from one [`PropertySource`] (by default a [`FileProperties`]), but a host
//! may rebind any single slot, e.g. to answer booleans from its own settings
//! while strings still come from the file.

mod file;

pub use file::FileProperties;

use std::fmt;
use std::sync::Arc;

use crate::error::PropertyError;

/// Property keys read by the reduction engine.
pub mod keys {
    /// Run local simulated reductions instead of the external pipeline.
    pub const FAKE: &str = "dprt.fake";
    /// Select full (true) or quick (false) external reductions.
    pub const FULL_REDUCTION: &str = "dprt.full_reduction";
    /// Enable master bias creation in real mode.
    pub const MAKE_MASTER_BIAS: &str = "dprt.make_master_bias";
    /// Enable master flat creation in real mode.
    pub const MAKE_MASTER_FLAT: &str = "dprt.make_master_flat";
    /// Telescope focus (mm) giving the sharpest images.
    pub const BEST_FOCUS: &str = "dprt.fake.best_focus";
    /// Seeing degradation (arcsec) per mm of defocus.
    pub const FWHM_PER_MM: &str = "dprt.fake.fwhm_per_mm";
    /// Baseline atmospheric seeing (arcsec).
    pub const ATMOSPHERIC_SEEING: &str = "dprt.fake.atmospheric_seeing";
    /// Upper bound of the random seeing noise term (arcsec).
    pub const ATMOSPHERIC_VARIATION: &str = "dprt.fake.atmospheric_variation";
}

/// A backend that can answer typed property lookups.
///
/// Only `get_string` is required; the typed getters parse its result. A
/// backend with native typed storage can override them.
pub trait PropertySource: Send + Sync {
    /// Look up the raw value for `keyword`, trailing whitespace stripped.
    fn get_string(&self, keyword: &str) -> Result<String, PropertyError>;

    fn get_int(&self, keyword: &str) -> Result<i64, PropertyError> {
        parse_int(keyword, &self.get_string(keyword)?)
    }

    fn get_double(&self, keyword: &str) -> Result<f64, PropertyError> {
        parse_double(keyword, &self.get_string(keyword)?)
    }

    fn get_bool(&self, keyword: &str) -> Result<bool, PropertyError> {
        parse_bool(keyword, &self.get_string(keyword)?)
    }
}

/// Parse an integer property value.
pub fn parse_int(keyword: &str, value: &str) -> Result<i64, PropertyError> {
    value
        .trim()
        .parse()
        .map_err(|_| PropertyError::MalformedInt {
            keyword: keyword.to_string(),
            value: value.to_string(),
        })
}

/// Parse a double property value.
pub fn parse_double(keyword: &str, value: &str) -> Result<f64, PropertyError> {
    value
        .trim()
        .parse()
        .map_err(|_| PropertyError::MalformedDouble {
            keyword: keyword.to_string(),
            value: value.to_string(),
        })
}

/// Parse a boolean property value. Only "true"/"false" (any case) are accepted.
pub fn parse_bool(keyword: &str, value: &str) -> Result<bool, PropertyError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(PropertyError::MalformedBool {
            keyword: keyword.to_string(),
            value: value.to_string(),
        })
    }
}

/// A single lookup slot.
pub type Lookup<T> = Arc<dyn Fn(&str) -> Result<T, PropertyError> + Send + Sync>;

/// Table of four typed lookup slots.
///
/// An unbound slot fails with [`PropertyError::NoBackend`] when used. Every
/// lookup rejects an empty keyword with [`PropertyError::NullArgument`]
/// before reaching the backend.
#[derive(Clone, Default)]
pub struct PropertyBindings {
    string: Option<Lookup<String>>,
    int: Option<Lookup<i64>>,
    double: Option<Lookup<f64>>,
    boolean: Option<Lookup<bool>>,
}

impl PropertyBindings {
    /// A table with no slots bound.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Bind all four slots to one source.
    pub fn from_source<S: PropertySource + 'static>(source: Arc<S>) -> Self {
        let string_src = Arc::clone(&source);
        let int_src = Arc::clone(&source);
        let double_src = Arc::clone(&source);
        let bool_src = source;
        Self {
            string: Some(Arc::new(move |k: &str| string_src.get_string(k))),
            int: Some(Arc::new(move |k: &str| int_src.get_int(k))),
            double: Some(Arc::new(move |k: &str| double_src.get_double(k))),
            boolean: Some(Arc::new(move |k: &str| bool_src.get_bool(k))),
        }
    }

    pub fn bind_string<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Result<String, PropertyError> + Send + Sync + 'static,
    {
        self.string = Some(Arc::new(lookup));
    }

    pub fn bind_int<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Result<i64, PropertyError> + Send + Sync + 'static,
    {
        self.int = Some(Arc::new(lookup));
    }

    pub fn bind_double<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Result<f64, PropertyError> + Send + Sync + 'static,
    {
        self.double = Some(Arc::new(lookup));
    }

    pub fn bind_bool<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Result<bool, PropertyError> + Send + Sync + 'static,
    {
        self.boolean = Some(Arc::new(lookup));
    }

    /// Unbind every slot.
    pub fn clear(&mut self) {
        *self = Self::unbound();
    }

    pub fn get_string(&self, keyword: &str) -> Result<String, PropertyError> {
        Self::dispatch(&self.string, "string", keyword)
    }

    pub fn get_int(&self, keyword: &str) -> Result<i64, PropertyError> {
        Self::dispatch(&self.int, "integer", keyword)
    }

    pub fn get_double(&self, keyword: &str) -> Result<f64, PropertyError> {
        Self::dispatch(&self.double, "double", keyword)
    }

    pub fn get_bool(&self, keyword: &str) -> Result<bool, PropertyError> {
        Self::dispatch(&self.boolean, "boolean", keyword)
    }

    fn dispatch<T>(
        slot: &Option<Lookup<T>>,
        kind: &'static str,
        keyword: &str,
    ) -> Result<T, PropertyError> {
        if keyword.is_empty() {
            return Err(PropertyError::NullArgument);
        }
        match slot {
            Some(lookup) => lookup(keyword),
            None => Err(PropertyError::NoBackend {
                kind,
                keyword: keyword.to_string(),
            }),
        }
    }
}

impl fmt::Debug for PropertyBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBindings")
            .field("string", &self.string.is_some())
            .field("int", &self.int.is_some())
            .field("double", &self.double.is_some())
            .field("boolean", &self.boolean.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_bindings(text: &str) -> PropertyBindings {
        PropertyBindings::from_source(Arc::new(FileProperties::parse(text)))
    }

    #[test]
    fn test_typed_lookups_through_file() {
        let bindings = file_bindings(
            "dprt.fake=true\ndprt.count=42\ndprt.fake.best_focus=27.5\nname=ratcam  \n",
        );
        assert!(bindings.get_bool("dprt.fake").unwrap());
        assert_eq!(bindings.get_int("dprt.count").unwrap(), 42);
        assert_eq!(bindings.get_double("dprt.fake.best_focus").unwrap(), 27.5);
        assert_eq!(bindings.get_string("name").unwrap(), "ratcam");
    }

    #[test]
    fn test_bool_rejects_maybe() {
        let bindings = file_bindings("dprt.fake=Maybe\n");
        let err = bindings.get_bool("dprt.fake").unwrap_err();
        assert!(matches!(err, PropertyError::MalformedBool { .. }));
        assert_eq!(err.code(), 105);
    }

    #[test]
    fn test_bool_is_case_insensitive() {
        assert!(parse_bool("k", "TRUE").unwrap());
        assert!(!parse_bool("k", "False").unwrap());
        assert!(parse_bool("k", "yes").is_err());
        assert!(parse_bool("k", "1").is_err());
    }

    #[test]
    fn test_malformed_numbers() {
        let bindings = file_bindings("a=twelve\nb=1.2.3\n");
        assert_eq!(bindings.get_int("a").unwrap_err().code(), 103);
        assert_eq!(bindings.get_double("b").unwrap_err().code(), 104);
    }

    #[test]
    fn test_unbound_slot_is_no_backend() {
        let bindings = PropertyBindings::unbound();
        let err = bindings.get_bool("dprt.fake").unwrap_err();
        assert!(matches!(err, PropertyError::NoBackend { kind: "boolean", .. }));
        assert_eq!(err.code(), 101);
    }

    #[test]
    fn test_empty_keyword_is_null_argument() {
        let bindings = file_bindings("=oops\n");
        assert_eq!(bindings.get_string("").unwrap_err(), PropertyError::NullArgument);
    }

    #[test]
    fn test_rebind_single_slot() {
        let mut bindings = file_bindings("dprt.fake=false\ndprt.name=file\n");
        bindings.bind_bool(|_| Ok(true));
        assert!(bindings.get_bool("dprt.fake").unwrap());
        assert_eq!(bindings.get_string("dprt.name").unwrap(), "file");
    }

    #[test]
    fn test_clear_unbinds_everything() {
        let mut bindings = file_bindings("dprt.fake=false\n");
        bindings.clear();
        assert_eq!(bindings.get_bool("dprt.fake").unwrap_err().code(), 101);
        assert!(format!("{bindings:?}").contains("boolean: false"));
    }
}
