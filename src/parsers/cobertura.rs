/// Parser for Cobertura XML coverage reports.
///
/// The structure we care about:
///   <coverage>
///     <sources><source>...</source></sources>
///     <packages><package><classes>
///       <class name="..." filename="...">
///         <lines><line number="..." hits="..."/></lines>
///       </class>
///     </classes></package></packages>
///   </coverage>
///
/// Branch and method data are skipped: the Coveralls line array carries
/// execution counts only.
use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::Result;
use crate::model::{CoverageData, FileCoverage, LineCoverage};
use crate::parsers::Parser;

pub struct CoberturaParser;

impl Parser for CoberturaParser {
    fn parse(&self, input: &[u8]) -> Result<CoverageData> {
        parse_cobertura(input)
    }
}

fn parse_cobertura(input: &[u8]) -> Result<CoverageData> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut data = CoverageData::new();
    let mut buf = Vec::new();

    let mut current: Option<FileCoverage> = None;
    // Lines may appear both under <method><lines> and <class><lines>; we
    // deduplicate by keeping the max hit count for each line number.
    let mut seen_lines: HashMap<u32, usize> = HashMap::new();

    // Path prefixes from <source> elements
    let mut sources: Vec<String> = Vec::new();
    let mut in_source = false;

    loop {
        let event = reader.read_event_into(&mut buf);
        let is_start_event = matches!(&event, Ok(Event::Start(_)));
        match event {
            Err(e) => return Err(e.into()),
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"source" => {
                    // Self-closing <source/> has no text content and no End
                    // event, so only Start events may set the flag.
                    if is_start_event {
                        in_source = true;
                    }
                }
                b"class" => {
                    if let Some(filename) = attr(e, b"filename") {
                        let path = resolve_source_path(&filename, &sources);
                        current = Some(FileCoverage::new(path));
                        seen_lines.clear();
                    }
                }
                b"line" => {
                    if let Some(file) = current.as_mut() {
                        record_line(file, &mut seen_lines, e);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_source {
                    if let Ok(text) = e.unescape() {
                        sources.push(text.to_string());
                    }
                    in_source = false;
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"source" => in_source = false,
                b"class" => {
                    if let Some(file) = current.take() {
                        data.files.push(file);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    // Handle unclosed file
    if let Some(file) = current.take() {
        data.files.push(file);
    }

    // Lines may have been collected from both <method> and <class> blocks;
    // sort within each file for consistent output.
    for file in &mut data.files {
        file.lines.sort_by_key(|l| l.line_number);
    }

    Ok(data)
}

/// Record one `<line number=".." hits=".."/>` element, deduplicating against
/// lines already collected for the current file.
fn record_line(file: &mut FileCoverage, seen: &mut HashMap<u32, usize>, e: &BytesStart) {
    let Some(line_number) = attr(e, b"number").and_then(|v| v.parse::<u32>().ok()) else {
        return;
    };
    let hit_count = attr(e, b"hits")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    match seen.get(&line_number) {
        Some(&idx) => {
            if hit_count > file.lines[idx].hit_count {
                file.lines[idx].hit_count = hit_count;
            }
        }
        None => {
            seen.insert(line_number, file.lines.len());
            file.lines.push(LineCoverage {
                line_number,
                hit_count,
            });
        }
    }
}

/// Look up a single attribute by local name.
fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes().filter_map(|a| a.ok()).find_map(|a| {
        if a.key.local_name().into_inner() == key {
            a.unescape_value().ok().map(|v| v.to_string())
        } else {
            None
        }
    })
}

/// Resolve a filename against the list of `<source>` prefixes.
///
/// - If the filename is already absolute, return it as-is.
/// - Otherwise, prepend the first non-empty source prefix.
/// - If no non-empty sources exist, return the filename unchanged.
fn resolve_source_path(filename: &str, sources: &[String]) -> String {
    if filename.starts_with('/') {
        return filename.to_string();
    }
    for source in sources {
        let base = source.trim_end_matches('/');
        if !base.is_empty() {
            return format!("{}/{}", base, filename);
        }
    }
    filename.to_string()
}
