//! Parsing of the engine's GetProjectSettings capabilities document.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

/// Geometry of a template's map frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    pub width: f64,
    pub height: f64,
    pub name: String,
}

/// One printable layout advertised by the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposerTemplate {
    pub name: String,
    pub map: MapFrame,
    #[serde(rename = "default")]
    pub is_default: bool,
}

/// Parse composer templates out of a capabilities document.
///
/// Templates are expected at a fixed nesting: `WMS_Capabilities` →
/// `Capability` → `ComposerTemplates` → `ComposerTemplate`, each carrying one
/// nested `ComposerMap`. A document that is not well-formed XML or does not
/// have this shape yields an empty list, never an error; callers must treat
/// an empty list as "unknown", not "zero templates configured".
pub fn parse_composer_templates(xml: &str) -> Vec<ComposerTemplate> {
    try_parse(xml).unwrap_or_default()
}

fn try_parse(xml: &str) -> Option<Vec<ComposerTemplate>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut templates = Vec::new();

    // Nesting trackers for the fixed capability path.
    let mut in_capabilities = false;
    let mut in_capability = false;
    let mut in_template_list = false;

    // Accumulator for the template element currently open.
    let mut current_name: Option<String> = None;
    let mut current_map: Option<MapFrame> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"WMS_Capabilities" => in_capabilities = true,
                b"Capability" if in_capabilities => in_capability = true,
                b"ComposerTemplates" if in_capability => in_template_list = true,
                b"ComposerTemplate" if in_template_list => {
                    current_name = Some(attribute(&e, b"name")?);
                    current_map = None;
                }
                b"ComposerMap" if current_name.is_some() => {
                    current_map = Some(read_map_frame(&e)?);
                }
                _ => {}
            },
            // A ComposerMap with no children arrives as a self-closed element.
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"ComposerMap" && current_name.is_some() {
                    current_map = Some(read_map_frame(&e)?);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"ComposerTemplate" if in_template_list => {
                    // A template without a map frame makes the whole
                    // document unusable.
                    let name = current_name.take()?;
                    let map = current_map.take()?;
                    templates.push(ComposerTemplate {
                        name,
                        map,
                        is_default: false,
                    });
                }
                b"ComposerTemplates" => in_template_list = false,
                b"Capability" => in_capability = false,
                b"WMS_Capabilities" => in_capabilities = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    Some(templates)
}

fn read_map_frame(e: &BytesStart<'_>) -> Option<MapFrame> {
    Some(MapFrame {
        width: attribute(e, b"width")?.parse().ok()?,
        height: attribute(e, b"height")?.parse().ok()?,
        name: attribute(e, b"name")?,
    })
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    for attr in e.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == key {
            return Some(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    None
}
