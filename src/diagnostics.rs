//! Diagnostics for degraded but usable results
//!
//! Layout computation and injection parsing tolerate malformed entries: the
//! offending field or pair is dropped and the rest of the result stays
//! usable. Each drop is recorded as a [`Diagnostic`] next to the value so
//! callers and tests can inspect it, and is also logged with `tracing`.

use thiserror::Error;

/// Something that was dropped or replaced while producing a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    #[error("param {field}: ptc/pfc combination {ptc}/{pfc} not supported ---> ignored")]
    UnsupportedType { field: String, ptc: u32, pfc: u32 },

    #[error("{packet}: PI1 and PI2 overlap ---> PI2 ignored")]
    IdentificationOverlap { packet: String },

    #[error("param {field} overlaps {identification} ---> ignored")]
    OverlapsIdentification { field: String, identification: String },

    #[error("param {field} overlaps {placed} ---> ignored")]
    OverlapsField { field: String, placed: String },

    #[error("parameter-names ({names}) and parameter-values ({values}) have different size")]
    MismatchedInjectionLists { names: usize, values: usize },

    #[error("{packet}: link of parameter {parameter} replaced")]
    ReplacedLink { packet: String, parameter: String },
}

/// A value together with the diagnostics collected while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosed<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Diagnosed<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Value without diagnostics.
    pub fn clean(value: T) -> Self {
        Self { value, diagnostics: Vec::new() }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Diagnosed<U> {
        Diagnosed { value: f(self.value), diagnostics: self.diagnostics }
    }
}
