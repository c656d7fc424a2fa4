// Raw device payloads
//
// The controller speaks two dialects: small XML documents for reads
// (`status.xml` flat, `config.xml` nested one level) and the HTML of the
// settings pages, which carries the current form values as inline
// JavaScript assignments. Both are reduced to a flat key -> string map here;
// typing and validation happen in `cyberq-core`.

use std::collections::BTreeMap;
use std::collections::btree_map;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::Error;

/// Flat key -> raw string view of everything the device reported.
///
/// Keys are the device's own element names (`COOK_TEMP`, `FOOD1_SET`, ...).
/// Only leaf elements are kept; container elements such as `<COOK>` or
/// `<CONTROL>` in `config.xml` are flattened away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayload {
    values: BTreeMap<String, String>,
}

impl RawPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one XML document into a payload.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        let mut payload = Self::new();
        payload.merge_xml(xml)?;
        Ok(payload)
    }

    /// Flatten the leaves of `xml` into this payload. Later values win.
    pub fn merge_xml(&mut self, xml: &str) -> Result<(), Error> {
        for (key, value) in flatten_xml(xml)? {
            self.values.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RawPayload {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

// ── XML flattening ──────────────────────────────────────────────────

struct OpenElement {
    name: String,
    text: String,
    has_children: bool,
}

fn malformed(message: impl Into<String>, xml: &str) -> Error {
    Error::MalformedResponse {
        message: message.into(),
        body: xml.chars().take(512).collect(),
    }
}

/// Collect `(element name, text)` for every leaf element in document order.
fn flatten_xml(xml: &str) -> Result<Vec<(String, String)>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut leaves = Vec::new();
    let mut saw_element = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(format!("invalid XML: {e}"), xml))?;

        match event {
            Event::Start(start) => {
                saw_element = true;
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                }
                stack.push(OpenElement {
                    name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                    text: String::new(),
                    has_children: false,
                });
            }
            Event::Empty(empty) => {
                saw_element = true;
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                }
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                leaves.push((name, String::new()));
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| malformed(format!("invalid text: {e}"), xml))?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&value);
                }
            }
            Event::CData(data) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let Some(open) = stack.pop() else {
                    return Err(malformed("unbalanced closing tag", xml));
                };
                if !open.has_children {
                    leaves.push((open.name, open.text.trim().to_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed("truncated document", xml));
    }
    if !saw_element {
        return Err(malformed("no elements in document", xml));
    }
    Ok(leaves)
}

// ── Settings page echo ──────────────────────────────────────────────

const FORM_PREFIX: &str = "document.mainForm.";
const TEMP_ENCODE: &str = "TempPICToHTML(";
const TEMP_DECODE: &str = "TempHTMLToPIC";

/// Extract the form values the device echoes back in a settings page.
///
/// Recognised lines:
///
/// ```text
/// document.mainForm.COOK_NAME.value = "Brisket";
/// document.mainForm.COOK_RAMP.selectedIndex = 2;
/// document.mainForm._COOK_SET.value = TempPICToHTML(2250,0);
/// ```
///
/// Temperatures keep the device's tenths-of-degree encoding. Assignments
/// whose right-hand side is a `TempHTMLToPIC` call are submit-side
/// conversions and carry no value.
pub fn form_values(html: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in html.lines() {
        if let Some((key, value)) = parse_form_line(line) {
            values.insert(key, value);
        }
    }
    values
}

fn parse_form_line(line: &str) -> Option<(String, String)> {
    let rest = line.trim().trim_end_matches('}').trim_end();
    let rest = rest.strip_prefix(FORM_PREFIX)?;
    let (target, rhs) = rest.split_once('=')?;
    let rhs = rhs.trim().strip_suffix(';')?.trim();
    let (key, property) = target.trim().rsplit_once('.')?;
    if property != "value" && property != "selectedIndex" {
        return None;
    }

    if let Some(hidden) = key.strip_prefix('_') {
        let args = rhs.strip_prefix(TEMP_ENCODE)?.strip_suffix(')')?;
        let (tenths, _) = args.split_once(',')?;
        return Some((hidden.to_owned(), tenths.trim().to_owned()));
    }

    if rhs.starts_with(TEMP_DECODE) {
        return None;
    }
    Some((key.to_owned(), rhs.trim_matches('"').to_owned()))
}
