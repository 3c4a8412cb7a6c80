//! printf-style entry name templates
//!
//! Entry names inside a UOP container follow a fixed pattern per data type,
//! e.g. `build/multicollection/%.6u.bin` for multis. Templates carry exactly
//! one unsigned conversion; `%%` is a literal percent sign.
//!
//! Supported conversion syntax: `%[-0][width][.precision]u` (`d` is accepted
//! as an alias since ids are never negative).

use crate::error::HashError;
use std::fmt;
use std::str::FromStr;

/// Parsed entry name template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    prefix: String,
    suffix: String,
    width: usize,
    precision: Option<usize>,
    zero_pad: bool,
    left_align: bool,
}

/// Conversion spec collected while scanning
#[derive(Default)]
struct Conversion {
    width: usize,
    precision: Option<usize>,
    zero_pad: bool,
    left_align: bool,
}

impl NameTemplate {
    /// Parse a template string.
    pub fn parse(template: &str) -> Result<Self, HashError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut conversion: Option<Conversion> = None;
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                if conversion.is_some() {
                    suffix.push(ch);
                } else {
                    prefix.push(ch);
                }
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                if conversion.is_some() {
                    suffix.push('%');
                } else {
                    prefix.push('%');
                }
                continue;
            }

            if conversion.is_some() {
                return Err(HashError::MultipleConversions(template.to_string()));
            }

            let mut spec = Conversion::default();

            while let Some(&flag) = chars.peek() {
                match flag {
                    '0' => spec.zero_pad = true,
                    '-' => spec.left_align = true,
                    _ => break,
                }
                chars.next();
            }

            spec.width = take_number(&mut chars);

            if chars.peek() == Some(&'.') {
                chars.next();
                spec.precision = Some(take_number(&mut chars));
            }

            match chars.next() {
                Some('u' | 'd') => conversion = Some(spec),
                Some(other) => {
                    return Err(HashError::UnsupportedConversion {
                        template: template.to_string(),
                        reason: format!("conversion character '{other}'"),
                    });
                }
                None => {
                    return Err(HashError::UnsupportedConversion {
                        template: template.to_string(),
                        reason: "template ends inside a conversion".to_string(),
                    });
                }
            }
        }

        let spec = conversion.ok_or_else(|| HashError::MissingConversion(template.to_string()))?;

        Ok(Self {
            source: template.to_string(),
            prefix,
            suffix,
            width: spec.width,
            precision: spec.precision,
            zero_pad: spec.zero_pad,
            left_align: spec.left_align,
        })
    }

    /// Format the name for one id.
    ///
    /// ```
    /// use uomulti_hash::NameTemplate;
    ///
    /// let template = NameTemplate::parse("build/multicollection/%.6u.bin")?;
    /// assert_eq!(template.format(42), "build/multicollection/000042.bin");
    /// # Ok::<(), uomulti_hash::HashError>(())
    /// ```
    pub fn format(&self, id: u32) -> String {
        let mut digits = id.to_string();

        if let Some(precision) = self.precision {
            if precision == 0 && id == 0 {
                digits.clear();
            } else if digits.len() < precision {
                digits = format!("{}{digits}", "0".repeat(precision - digits.len()));
            }
        }

        let padding = self.width.saturating_sub(digits.len());
        let field = if padding == 0 {
            digits
        } else if self.left_align {
            format!("{digits}{}", " ".repeat(padding))
        } else if self.zero_pad && self.precision.is_none() {
            format!("{}{digits}", "0".repeat(padding))
        } else {
            format!("{}{digits}", " ".repeat(padding))
        };

        format!("{}{field}{}", self.prefix, self.suffix)
    }

    /// The template text this was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> usize {
    let mut value = 0usize;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(digit as usize);
        chars.next();
    }
    value
}

impl FromStr for NameTemplate {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
