//! Column-to-rows expansion ("explode").
//!
//! Each source row yields one output row per element of the exploded field. A source row whose
//! field is absent or empty yields no rows at all.
//!
//! Three input shapes are supported:
//!
//! - delimited text, optionally wrapped in brackets (`"a,b,c"` or `"[a,b,c]"`), split on a
//!   regular-expression delimiter;
//! - JSON array text (`["a", 1, true]`), one row per element;
//! - any typed collection (`Vec`, arrays, sets, ...), iterated directly; optional collections
//!   (`Option<Vec<_>>`) go through [`Frame::explode_collection_opt`], where `None` yields no rows.
//!
//! Every shape has a tuple form (`FI2<row, element>`) and a setter form that writes the element
//! into a copy of the row.

use regex::Regex;

use crate::error::{FrameError, FrameResult};
use crate::types::{FI2, Frame};

/// Split delimited text into tokens, stripping one pair of surrounding brackets.
///
/// Empty text (after stripping) yields no tokens. Trailing empty tokens are dropped, interior
/// ones are kept.
pub fn split_delimited(text: &str, delimiter: &Regex) -> Vec<String> {
    let body = text
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(text);
    if body.is_empty() {
        return Vec::new();
    }
    let mut tokens: Vec<String> = delimiter.split(body).map(str::to_string).collect();
    while tokens.last().is_some_and(String::is_empty) {
        tokens.pop();
    }
    tokens
}

/// Parse JSON array text into element strings.
///
/// Strings are unquoted, numbers and booleans use their JSON text, nested arrays and objects are
/// kept as JSON text, and `null` elements are skipped.
pub fn parse_json_array(text: &str) -> FrameResult<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(FrameError::type_conversion(format!(
            "expected a json array, got '{text}'"
        )));
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect())
}

fn text_or_none(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

impl<T: Clone> Frame<T> {
    fn explode_rows<E, I, F>(&self, mut elements: F) -> FrameResult<Vec<(&T, E)>>
    where
        I: IntoIterator<Item = E>,
        F: FnMut(&T) -> FrameResult<I>,
    {
        let mut out = Vec::with_capacity(self.len());
        for r in self.iter() {
            out.extend(elements(r)?.into_iter().map(|e| (r, e)));
        }
        tracing::trace!(input_rows = self.len(), output_rows = out.len(), "explode");
        Ok(out)
    }

    fn explode_items<E, I, G>(&self, get: G) -> Vec<(&T, E)>
    where
        I: IntoIterator<Item = E>,
        G: Fn(&T) -> I,
    {
        self.iter()
            .flat_map(|r| get(r).into_iter().map(move |e| (r, e)))
            .collect()
    }

    fn pair_rows<E>(&self, pairs: Vec<(&T, E)>) -> Frame<FI2<T, E>> {
        self.derive(pairs.into_iter().map(|(r, e)| FI2::new(r.clone(), e)).collect())
    }

    fn set_rows<E, S>(&self, pairs: Vec<(&T, E)>, mut set: S) -> Frame<T>
    where
        S: FnMut(&mut T, E),
    {
        let rows = pairs
            .into_iter()
            .map(|(r, e)| {
                let mut out = r.clone();
                set(&mut out, e);
                out
            })
            .collect();
        self.derive(rows)
    }

    /// Explode delimited text; `delimiter` is a regular expression.
    pub fn explode_string<G>(&self, get: G, delimiter: &str) -> FrameResult<Frame<FI2<T, String>>>
    where
        G: Fn(&T) -> Option<&str>,
    {
        let re = Regex::new(delimiter)?;
        let pairs = self.explode_rows(|r| {
            Ok(text_or_none(get(r))
                .map(|s| split_delimited(s, &re))
                .unwrap_or_default())
        })?;
        Ok(self.pair_rows(pairs))
    }

    /// Explode delimited text, writing each token into a copy of the row.
    pub fn explode_string_with<G, W>(&self, get: G, set: W, delimiter: &str) -> FrameResult<Frame<T>>
    where
        G: Fn(&T) -> Option<&str>,
        W: FnMut(&mut T, String),
    {
        let re = Regex::new(delimiter)?;
        let pairs = self.explode_rows(|r| {
            Ok(text_or_none(get(r))
                .map(|s| split_delimited(s, &re))
                .unwrap_or_default())
        })?;
        Ok(self.set_rows(pairs, set))
    }

    /// Explode JSON array text.
    pub fn explode_json_array<G>(&self, get: G) -> FrameResult<Frame<FI2<T, String>>>
    where
        G: Fn(&T) -> Option<&str>,
    {
        let pairs = self.explode_rows(|r| match text_or_none(get(r)) {
            Some(s) => parse_json_array(s),
            None => Ok(Vec::new()),
        })?;
        Ok(self.pair_rows(pairs))
    }

    /// Explode JSON array text, writing each element into a copy of the row.
    pub fn explode_json_array_with<G, W>(&self, get: G, set: W) -> FrameResult<Frame<T>>
    where
        G: Fn(&T) -> Option<&str>,
        W: FnMut(&mut T, String),
    {
        let pairs = self.explode_rows(|r| match text_or_none(get(r)) {
            Some(s) => parse_json_array(s),
            None => Ok(Vec::new()),
        })?;
        Ok(self.set_rows(pairs, set))
    }

    /// Explode a typed collection (or array) field.
    pub fn explode_collection<E, I, G>(&self, get: G) -> Frame<FI2<T, E>>
    where
        I: IntoIterator<Item = E>,
        G: Fn(&T) -> I,
    {
        let pairs = self.explode_items(get);
        self.pair_rows(pairs)
    }

    /// Explode a typed collection field, writing each element into a copy of the row.
    pub fn explode_collection_with<E, I, G, W>(&self, get: G, set: W) -> Frame<T>
    where
        I: IntoIterator<Item = E>,
        G: Fn(&T) -> I,
        W: FnMut(&mut T, E),
    {
        let pairs = self.explode_items(get);
        self.set_rows(pairs, set)
    }

    /// Explode an optional collection field; `None` yields no rows for that record.
    pub fn explode_collection_opt<E, I, G>(&self, get: G) -> Frame<FI2<T, E>>
    where
        I: IntoIterator<Item = E>,
        G: Fn(&T) -> Option<I>,
    {
        let pairs = self.explode_items(|r| get(r).into_iter().flatten());
        self.pair_rows(pairs)
    }

    /// Explode an optional collection field, writing each element into a copy of the row.
    pub fn explode_collection_opt_with<E, I, G, W>(&self, get: G, set: W) -> Frame<T>
    where
        I: IntoIterator<Item = E>,
        G: Fn(&T) -> Option<I>,
        W: FnMut(&mut T, E),
    {
        let pairs = self.explode_items(|r| get(r).into_iter().flatten());
        self.set_rows(pairs, set)
    }
}
