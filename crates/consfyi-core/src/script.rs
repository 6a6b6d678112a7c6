use regex::Regex;
use zhconv::{Variant, zhconv};

use crate::error::MaterializeError;

/// Canonical Chinese script variants the derivation stage converts
/// between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Hans,
    Hant,
}

impl Script {
    pub fn locale_tag(self) -> &'static str {
        match self {
            Script::Hans => "zh-Hans",
            Script::Hant => "zh-Hant",
        }
    }

    pub fn opposite(self) -> Script {
        match self {
            Script::Hans => Script::Hant,
            Script::Hant => Script::Hans,
        }
    }

    fn variant(self) -> Variant {
        match self {
            Script::Hans => Variant::ZhHans,
            Script::Hant => Variant::ZhHant,
        }
    }
}

/// Maps region-specific locale tags onto the canonical script tag.
pub fn script_for_locale(locale: &str) -> Option<Script> {
    match locale {
        "zh" | "zh-CN" | "zh-SG" | "zh-MY" | "zh-Hans" => Some(Script::Hans),
        "zh-TW" | "zh-HK" | "zh-MO" | "zh-Hant" => Some(Script::Hant),
        _ => None,
    }
}

/// Read-only simplified/traditional conversion service, constructed
/// once per run and handed into the derivation stage. The conversion
/// tables themselves are compiled into the binary; the Han detector is
/// the only fallible part of setup.
pub struct ScriptConverter {
    han: Regex,
}

impl ScriptConverter {
    pub fn new() -> Result<Self, MaterializeError> {
        let han = Regex::new(r"\p{Han}").map_err(|err| MaterializeError::Script(err.to_string()))?;
        Ok(Self { han })
    }

    pub fn contains_han(&self, text: &str) -> bool {
        self.han.is_match(text)
    }

    /// Converts `text` into `target`, or `None` when the text carries
    /// no Han content at all. The gate keeps purely-Latin or numeric
    /// fields from growing spurious translation entries.
    pub fn convert(&self, text: &str, target: Script) -> Option<String> {
        if !self.contains_han(text) {
            return None;
        }
        Some(zhconv(text, target.variant()))
    }
}
