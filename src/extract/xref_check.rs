//! Cross-reference validation.
//!
//! Counts anomalies in a PDF's cross-reference data without repairing
//! anything: every in-use entry of a classic xref table must point at the
//! `N G obj` header of the object it describes.
//!
//! Supports traditional xref tables (PDF 1.0-1.4), including incremental
//! updates chained through `/Prev`. Cross-reference streams (PDF 1.5+) are
//! only checked for their own location, since their entries are compressed.

use lazy_static::lazy_static;
use nom::{
    bytes::complete::{tag, take_while},
    character::complete::{digit1, one_of},
    combinator::map_res,
    multi::many1,
    sequence::{pair, preceded, tuple},
    IResult,
};
use std::collections::HashSet;

lazy_static! {
    /// "N G obj" at the start of a window, after optional whitespace
    static ref RE_OBJ_HEADER: regex::bytes::Regex =
        regex::bytes::Regex::new(r"^\s*(\d+)\s+(\d+)\s+obj\b").unwrap();

    /// "/Prev <offset>" inside a trailer or xref stream dictionary
    static ref RE_PREV: regex::bytes::Regex = regex::bytes::Regex::new(r"/Prev\s+(\d+)").unwrap();
}

/// How far back from EOF to look for `startxref`.
const TAIL_WINDOW: usize = 2048;

/// How far past a section to look for its `/Prev` key.
const DICT_WINDOW: usize = 4096;

/// Upper bound on chained sections, guards against `/Prev` cycles.
const MAX_SECTIONS: usize = 64;

/// Result of validating a file's cross-reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XrefReport {
    /// Offset named by the final `startxref`, if one was found
    pub start_offset: Option<u64>,
    /// Number of sections (tables or streams) visited
    pub sections: usize,
    /// In-use entries whose target was checked
    pub entries_checked: usize,
    /// Whether any section was a cross-reference stream
    pub uses_xref_stream: bool,
    /// Anomalies found
    pub errors: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct XrefEntry {
    offset: u64,
    generation: u64,
    in_use: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Subsection {
    first_object: u64,
    entries: Vec<XrefEntry>,
}

fn is_pdf_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0c' | b'\0')
}

fn ws(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while(is_pdf_whitespace)(input)
}

fn uint(input: &[u8]) -> IResult<&[u8], u64> {
    map_res(digit1, |digits: &[u8]| {
        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or(())
    })(input)
}

/// `oooooooooo ggggg n` (or `f`)
fn entry(input: &[u8]) -> IResult<&[u8], XrefEntry> {
    let (rest, (offset, generation, kind)) = tuple((
        preceded(ws, uint),
        preceded(ws, uint),
        preceded(ws, one_of("nf")),
    ))(input)?;
    Ok((
        rest,
        XrefEntry {
            offset,
            generation,
            in_use: kind == 'n',
        },
    ))
}

/// `first count` followed by `count` entries
fn subsection(input: &[u8]) -> IResult<&[u8], Subsection> {
    let (mut input, (first_object, count)) = pair(preceded(ws, uint), preceded(ws, uint))(input)?;
    let mut entries = Vec::with_capacity(count.min(4096) as usize);
    for _ in 0..count {
        let (rest, e) = entry(input)?;
        entries.push(e);
        input = rest;
    }
    Ok((
        input,
        Subsection {
            first_object,
            entries,
        },
    ))
}

fn xref_table(input: &[u8]) -> IResult<&[u8], Vec<Subsection>> {
    preceded(pair(ws, tag("xref")), many1(subsection))(input)
}

/// Find the offset following the last `startxref` keyword.
pub fn find_startxref(bytes: &[u8]) -> Option<u64> {
    let tail_start = bytes.len().saturating_sub(TAIL_WINDOW);
    let tail = &bytes[tail_start..];
    let keyword = b"startxref";
    let pos = tail.windows(keyword.len()).rposition(|w| w == keyword)?;
    let after = &tail[pos + keyword.len()..];
    let (_, offset) = preceded(ws, uint)(after).ok()?;
    Some(offset)
}

/// Object and generation numbers of the header at `offset`, if any.
fn object_header_at(bytes: &[u8], offset: u64) -> Option<(u64, u64)> {
    let start = usize::try_from(offset).ok()?;
    if start >= bytes.len() {
        return None;
    }
    let window = &bytes[start..bytes.len().min(start + 64)];
    let caps = RE_OBJ_HEADER.captures(window)?;
    let num = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?.parse().ok()?;
    let gen = std::str::from_utf8(caps.get(2)?.as_bytes()).ok()?.parse().ok()?;
    Some((num, gen))
}

fn find_prev(window: &[u8]) -> Option<u64> {
    let caps = RE_PREV.captures(window)?;
    std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?.parse().ok()
}

/// Dictionary region following `start`, cut at the next `keyword`.
fn dict_window<'a>(bytes: &'a [u8], start: usize, keyword: &[u8]) -> &'a [u8] {
    let end = bytes.len().min(start + DICT_WINDOW);
    let region = &bytes[start..end];
    match region.windows(keyword.len()).position(|w| w == keyword) {
        Some(pos) => &region[..pos],
        None => region,
    }
}

/// Validate the cross-reference data of a whole file.
pub fn check_xref(bytes: &[u8]) -> XrefReport {
    let mut report = XrefReport::default();

    let Some(start) = find_startxref(bytes) else {
        log::debug!("No startxref keyword found");
        report.errors += 1;
        return report;
    };
    report.start_offset = Some(start);

    let mut visited = HashSet::new();
    let mut next = Some(start);
    while let Some(offset) = next.take() {
        if !visited.insert(offset) || report.sections >= MAX_SECTIONS {
            log::debug!("Cross-reference chain loops back to offset {}", offset);
            report.errors += 1;
            break;
        }
        let Some(section_start) = usize::try_from(offset).ok().filter(|&o| o < bytes.len())
        else {
            log::debug!("Cross-reference offset {} beyond end of file", offset);
            report.errors += 1;
            break;
        };
        report.sections += 1;

        let input = &bytes[section_start..];
        match xref_table(input) {
            Ok((rest, subsections)) => {
                for sub in &subsections {
                    check_subsection(bytes, sub, &mut report);
                }
                let trailer_start = bytes.len() - rest.len();
                next = find_prev(dict_window(bytes, trailer_start, b"startxref"));
            },
            Err(_) if object_header_at(bytes, offset).is_some() => {
                report.uses_xref_stream = true;
                next = find_prev(dict_window(bytes, section_start, b"stream"));
            },
            Err(_) => {
                log::debug!("No cross-reference section at offset {}", offset);
                report.errors += 1;
            },
        }
    }
    report
}

fn check_subsection(bytes: &[u8], sub: &Subsection, report: &mut XrefReport) {
    for (i, e) in sub.entries.iter().enumerate() {
        if !e.in_use {
            continue;
        }
        let object_number = sub.first_object + i as u64;
        report.entries_checked += 1;
        match object_header_at(bytes, e.offset) {
            Some((num, gen)) if num == object_number && gen == e.generation => {},
            found => {
                log::debug!(
                    "xref entry for object {} {} points at offset {} ({:?})",
                    object_number,
                    e.generation,
                    e.offset,
                    found
                );
                report.errors += 1;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a classic PDF from object bodies, computing real offsets.
    /// `skew` is added to every recorded offset to simulate a damaged table.
    fn build_pdf(bodies: &[&str], skew: i64) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in bodies.iter().enumerate() {
            offsets.push(out.len() as i64);
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", bodies.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for off in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", off + skew).as_bytes());
        }
        out.extend_from_slice(
            format!("trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n", bodies.len() + 1, xref_at)
                .as_bytes(),
        );
        out
    }

    const BODIES: [&str; 3] = [
        "<< /Type /Catalog /Pages 2 0 R >>",
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>",
    ];

    #[test]
    fn test_clean_table_has_no_errors() {
        let pdf = build_pdf(&BODIES, 0);
        let report = check_xref(&pdf);
        assert_eq!(report.errors, 0, "{:?}", report);
        assert_eq!(report.sections, 1);
        assert_eq!(report.entries_checked, 3);
        assert!(!report.uses_xref_stream);
    }

    #[test]
    fn test_shifted_offsets_are_counted() {
        let pdf = build_pdf(&BODIES, 3);
        let report = check_xref(&pdf);
        assert_eq!(report.errors, 3);
    }

    #[test]
    fn test_missing_startxref() {
        let report = check_xref(b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF");
        assert_eq!(report.errors, 1);
        assert_eq!(report.start_offset, None);
    }

    #[test]
    fn test_startxref_past_eof() {
        let mut pdf = build_pdf(&BODIES, 0);
        pdf.extend_from_slice(b"startxref\n999999\n%%EOF\n");
        let report = check_xref(&pdf);
        assert_eq!(report.start_offset, Some(999_999));
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn test_startxref_pointing_at_garbage() {
        let mut pdf = build_pdf(&BODIES, 0);
        pdf.extend_from_slice(b"startxref\n3\n%%EOF\n");
        assert_eq!(check_xref(&pdf).errors, 1);
    }

    #[test]
    fn test_prev_chain_is_followed() {
        let mut pdf = build_pdf(&BODIES, 0);
        let first_xref = find_startxref(&pdf).unwrap();
        // Incremental update re-declaring object 3
        let obj_at = pdf.len();
        pdf.extend_from_slice(b"3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n");
        let xref_at = pdf.len();
        pdf.extend_from_slice(format!("xref\n3 1\n{:010} 00000 n \n", obj_at).as_bytes());
        pdf.extend_from_slice(
            format!("trailer\n<< /Size 4 /Root 1 0 R /Prev {} >>\nstartxref\n{}\n%%EOF\n", first_xref, xref_at)
                .as_bytes(),
        );
        let report = check_xref(&pdf);
        assert_eq!(report.sections, 2);
        assert_eq!(report.entries_checked, 4);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_xref_stream_location_is_accepted() {
        let mut pdf = b"%PDF-1.5\n".to_vec();
        let at = pdf.len();
        pdf.extend_from_slice(b"5 0 obj\n<< /Type /XRef /Size 6 /W [1 2 1] >>\nstream\n\nendstream\nendobj\n");
        pdf.extend_from_slice(format!("startxref\n{}\n%%EOF\n", at).as_bytes());
        let report = check_xref(&pdf);
        assert!(report.uses_xref_stream);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_entry_parser() {
        let (_, e) = entry(b"0000000017 00000 n \n").unwrap();
        assert_eq!(e, XrefEntry { offset: 17, generation: 0, in_use: true });
        let (_, e) = entry(b"\r\n0000000000 65535 f").unwrap();
        assert!(!e.in_use);
        assert_eq!(e.generation, 65535);
    }
}
