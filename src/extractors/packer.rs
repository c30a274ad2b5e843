//! Unpacking of Dean Edwards' `eval(function(p,a,c,k,e,d){...})` packed scripts.
//!
//! Several hosts hide their player setup in packed JavaScript. The common
//! layout is unpacked natively. Anything else is handed to an embedded QuickJS
//! runtime which runs the unpacking function itself.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rquickjs::{Context, Runtime, Value};
use tracing::debug;

static PACKED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)eval\(function\(p,a,c,k,e,[dr]\)\{.+?\}\('(.*)',\s*(\d+),\s*(\d+),\s*'(.*?)'\.split\('\|'\)")
        .expect("packed script regex should compile")
});
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("word regex should compile"));
const PACKED_START: &str = "eval(function(p,a,c,k,e,";
const DIGITS: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The arguments a packed script passes to its unpacking function.
#[derive(Debug, Clone, PartialEq)]
pub struct Packed {
    pub payload: String,
    pub radix: u32,
    pub count: usize,
    pub words: Vec<String>,
}

impl Packed {
    pub fn find(page: &str) -> Result<Option<Self>> {
        let Some(captures) = PACKED.captures(page) else {
            return Ok(None);
        };

        let radix: u32 = captures[2].parse()?;
        if !(2..=62).contains(&radix) {
            anyhow::bail!("radix must be in 2..62, got {}", radix);
        }

        Ok(Some(Self {
            payload: captures[1].to_string(),
            radix,
            count: captures[3].parse()?,
            words: captures[4].split('|').map(String::from).collect(),
        }))
    }

    /// Replaces every encoded word token by its dictionary entry.
    pub fn unpack(&self) -> Result<String> {
        let limit = self.count.min(self.words.len());
        let unpacked = WORD.replace_all(&self.payload, |caps: &Captures| {
            let word = &caps[0];
            match from_radix(word, self.radix) {
                Some(i) if i < limit && !self.words[i].is_empty() => self.words[i].clone(),
                _ => word.to_string(),
            }
        });
        Ok(unpacked.into_owned())
    }
}

fn from_radix(token: &str, radix: u32) -> Option<usize> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    let alphabet = &DIGITS[..radix as usize];
    token.chars().try_fold(0usize, |acc, c| {
        let digit = alphabet.find(c)?;
        acc.checked_mul(radix as usize)?.checked_add(digit)
    })
}

/// Unpacks the first packed script found in `page`.
pub fn unpack_page(page: &str) -> Result<String> {
    if let Some(packed) = Packed::find(page)? {
        let unpacked = packed.unpack()?;
        debug!("Unpacked page code: {}", unpacked);
        return Ok(unpacked);
    }

    let start = page
        .find(PACKED_START)
        .ok_or_else(|| anyhow::anyhow!("No packed script found"))?;
    // evaluate the call without the surrounding eval, its value is the source
    let call = balanced_call(&page[start + "eval".len()..])
        .ok_or_else(|| anyhow::anyhow!("Packed script is not terminated"))?;
    let unpacked = JsUnpacker::new().execute(call)?;
    debug!("Unpacked page code with QuickJS: {}", unpacked);
    Ok(unpacked)
}

/// The parenthesised expression at the start of `code`, string literals
/// included.
fn balanced_call(code: &str) -> Option<&str> {
    if !code.starts_with('(') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in code.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&code[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Runs unpacking code in a throwaway QuickJS context.
pub struct JsUnpacker;

impl JsUnpacker {
    pub fn new() -> Self {
        Self
    }

    /// Clean JavaScript code by removing null bytes
    fn clean_js_code(js_code: &str) -> String {
        js_code.replace('\0', "")
    }

    /// Execute JavaScript code and return the resulting string
    pub fn execute(&self, code: &str) -> Result<String> {
        let code = Self::clean_js_code(code);
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;

        context.with(|ctx| {
            let result: Value = ctx.eval(code.as_bytes()).map_err(|e| {
                debug!("Failed to evaluate packed script of {} bytes: {}", code.len(), e);
                anyhow::anyhow!("Failed to evaluate JavaScript: {}", e)
            })?;
            match result.as_string() {
                Some(s) => Ok(s.to_string()?),
                None => anyhow::bail!("Packed script did not produce a string"),
            }
        })
    }
}

impl Default for JsUnpacker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKED: &str = r#"<script>eval(function(p,a,c,k,e,d){while(c--)if(k[c])p=p.replace(new RegExp('\\b'+c.toString(a)+'\\b','g'),k[c]);return p}('0.1("2","3://4.5/6.7")',8,8,'so|addVariable|file|http|cdn|example|movie|flv'.split('|'),0,{}))</script>"#;

    #[test]
    fn test_find_packed_arguments() {
        let packed = Packed::find(PACKED).unwrap().unwrap();
        assert_eq!(packed.radix, 8);
        assert_eq!(packed.count, 8);
        assert_eq!(packed.words.len(), 8);
    }

    #[test]
    fn test_unpack_native() {
        let unpacked = unpack_page(PACKED).unwrap();
        assert_eq!(unpacked, r#"so.addVariable("file","http://cdn.example/movie.flv")"#);
    }

    #[test]
    fn test_from_radix() {
        assert_eq!(from_radix("a", 36), Some(10));
        assert_eq!(from_radix("Z", 62), Some(61));
        assert_eq!(from_radix("10", 62), Some(62));
        assert_eq!(from_radix("z", 10), None);
        assert_eq!(from_radix("01", 10), None);
    }

    #[test]
    fn test_balanced_call_skips_strings() {
        let code = r#"(f('a)b', "c(d"))trailing"#;
        assert_eq!(balanced_call(code), Some(r#"(f('a)b', "c(d"))"#));
        assert_eq!(balanced_call("(unterminated"), None);
    }

    #[test]
    fn test_js_unpacker_executes() {
        let result = JsUnpacker::new().execute("['a','b'].join('|')").unwrap();
        assert_eq!(result, "a|b");
    }
}
