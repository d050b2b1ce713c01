//! Sitemap protocol XML: `<urlset>` documents and the `<sitemapindex>`.

use std::fmt;
use std::io::Write;

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::models::sitemap::{LASTMOD_FORMAT, SITEMAP_NAMESPACE};
use crate::models::{ChangeFreq, IndexEntry, UrlEntry};

/// Malformed or unwritable sitemap XML.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct XmlError(String);

impl XmlError {
    fn new(message: impl fmt::Display) -> Self {
        Self(message.to_string())
    }
}

type XmlResult<T> = std::result::Result<T, XmlError>;

/// Serialize a `<urlset>` document, declaration included.
pub fn encode_urlset(entries: &[UrlEntry]) -> XmlResult<Vec<u8>> {
    let mut writer = document_writer()?;
    let root = BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NAMESPACE)]);
    write(&mut writer, Event::Start(root))?;

    for entry in entries {
        write(&mut writer, Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        if let Some(lastmod) = entry.lastmod {
            write_text_element(&mut writer, "lastmod", &lastmod.format(LASTMOD_FORMAT).to_string())?;
        }
        if let Some(freq) = entry.changefreq {
            write_text_element(&mut writer, "changefreq", freq.as_str())?;
        }
        if let Some(priority) = entry.priority {
            write_text_element(&mut writer, "priority", &priority.to_string())?;
        }
        write(&mut writer, Event::End(BytesEnd::new("url")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("urlset")))?;
    finish(writer)
}

/// Serialize a `<sitemapindex>` document, declaration included.
pub fn encode_index(entries: &[IndexEntry]) -> XmlResult<Vec<u8>> {
    let mut writer = document_writer()?;
    let root = BytesStart::new("sitemapindex").with_attributes([("xmlns", SITEMAP_NAMESPACE)]);
    write(&mut writer, Event::Start(root))?;

    for entry in entries {
        write(&mut writer, Event::Start(BytesStart::new("sitemap")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        write_text_element(
            &mut writer,
            "lastmod",
            &entry.lastmod.format(LASTMOD_FORMAT).to_string(),
        )?;
        write(&mut writer, Event::End(BytesEnd::new("sitemap")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("sitemapindex")))?;
    finish(writer)
}

/// Parse the `<url>` entries of a `<urlset>` document.
pub fn decode_urlset(xml: &str) -> XmlResult<Vec<UrlEntry>> {
    read_records(xml, "urlset", "url")?
        .into_iter()
        .map(|fields| {
            let mut entry = UrlEntry::new(String::new());
            let mut changefreq = None;
            for (name, text) in fields {
                match name.as_str() {
                    "loc" => entry.loc = text,
                    "lastmod" => entry.lastmod = Some(parse_lastmod(&text)?),
                    "changefreq" => changefreq = Some(text),
                    "priority" => {
                        entry.priority = Some(text.parse::<f64>().map_err(|e| {
                            XmlError::new(format!("invalid priority '{text}': {e}"))
                        })?)
                    }
                    _ => {}
                }
            }
            if entry.loc.is_empty() {
                return Err(XmlError::new("<url> without <loc>"));
            }
            // older files may carry free-form values; keep the entry, drop the field
            entry.changefreq = changefreq.and_then(|text| match text.parse::<ChangeFreq>() {
                Ok(freq) => Some(freq),
                Err(_) => {
                    log::warn!("Ignoring unknown changefreq '{text}' for {}", entry.loc);
                    None
                }
            });
            Ok(entry)
        })
        .collect()
}

/// Parse the `<sitemap>` entries of a `<sitemapindex>` document.
pub fn decode_index(xml: &str) -> XmlResult<Vec<IndexEntry>> {
    read_records(xml, "sitemapindex", "sitemap")?
        .into_iter()
        .map(|fields| {
            let mut loc = None;
            let mut lastmod = None;
            for (name, text) in fields {
                match name.as_str() {
                    "loc" => loc = Some(text),
                    "lastmod" => lastmod = Some(parse_lastmod(&text)?),
                    _ => {}
                }
            }
            match (loc, lastmod) {
                (Some(loc), Some(lastmod)) => Ok(IndexEntry { loc, lastmod }),
                _ => Err(XmlError::new("<sitemap> needs both <loc> and <lastmod>")),
            }
        })
        .collect()
}

/// Accepts `YYYY-MM-DD` or a W3C datetime that starts with one.
fn parse_lastmod(text: &str) -> XmlResult<NaiveDate> {
    let date = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date, LASTMOD_FORMAT)
        .map_err(|e| XmlError::new(format!("invalid lastmod '{text}': {e}")))
}

fn document_writer() -> XmlResult<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    Ok(writer)
}

fn write<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> XmlResult<()> {
    writer.write_event(event).map_err(XmlError::new)
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> XmlResult<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn finish(writer: Writer<Vec<u8>>) -> XmlResult<Vec<u8>> {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Collect `(child name, text)` pairs for every `record` element under `root`.
fn read_records(xml: &str, root: &str, record: &str) -> XmlResult<Vec<Vec<(String, String)>>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut seen_root = false;
    let mut current: Option<Vec<(String, String)>> = None;
    let mut field: Option<(String, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !seen_root {
                    if name != root {
                        return Err(XmlError::new(format!(
                            "expected <{root}> root element, found <{name}>"
                        )));
                    }
                    seen_root = true;
                } else if name == record {
                    current = Some(Vec::new());
                } else if current.is_some() {
                    field = Some((name, String::new()));
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some((_, text)) = field.as_mut() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| XmlError::new(format!("bad text content: {e}")))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(ref c)) => {
                if let Some((_, text)) = field.as_mut() {
                    text.push_str(&String::from_utf8_lossy(c.as_ref()));
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                if name.as_ref() == record.as_bytes() {
                    if let Some(fields) = current.take() {
                        records.push(fields);
                    }
                } else if let Some((field_name, _)) = field.as_ref() {
                    if name.as_ref() == field_name.as_bytes() {
                        if let (Some(fields), Some(done)) = (current.as_mut(), field.take()) {
                            fields.push(done);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmlError::new(format!(
                    "XML parsing error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(XmlError::new(format!("missing <{root}> root element")));
    }
    Ok(records)
}
