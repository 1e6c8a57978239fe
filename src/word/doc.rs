//! Legacy Word (.doc) text extraction
//!
//! A `.doc` file is an OLE compound file. The main document text is located
//! through the piece table (CLX) stored in the `0Table` or `1Table` stream,
//! whose offsets come from the FIB at the start of the `WordDocument` stream.
//! Each piece is either 8-bit (cp1252) or UTF-16LE text inside `WordDocument`.

use std::io::{Cursor, Read};

use super::ExtractionError;

/// `wIdent` of a Word 97+ FIB
const WORD_MAGIC: u16 = 0xA5EC;
/// `fWhichTblStm`: table stream is `1Table`
const FLAG_WHICH_TABLE: u16 = 0x0200;
/// `fEncrypted`
const FLAG_ENCRYPTED: u16 = 0x0100;
/// Index of the `fcClx`/`lcbClx` pair in `FibRgFcLcb97`
const CLX_PAIR_INDEX: usize = 33;
/// `fCompressed` bit of a piece's file offset
const PIECE_COMPRESSED: u32 = 0x4000_0000;

/// Extract the main document text from `.doc` bytes
pub fn extract_doc_text(data: &[u8]) -> Result<String, ExtractionError> {
    let mut compound = cfb::CompoundFile::open(Cursor::new(data))
        .map_err(|e| ExtractionError::Compound(format!("not an OLE compound file: {}", e)))?;

    let word = read_stream(&mut compound, "WordDocument")?;
    let fib = Fib::parse(&word)?;
    let table_name = if fib.table_one { "1Table" } else { "0Table" };
    let table = read_stream(&mut compound, table_name)?;

    text_from_streams(&fib, &word, &table)
}

fn read_stream(
    compound: &mut cfb::CompoundFile<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, ExtractionError> {
    let mut stream = compound
        .open_stream(name)
        .map_err(|e| ExtractionError::Compound(format!("missing stream {}: {}", name, e)))?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

/// The handful of FIB fields needed to find the text
#[derive(Debug)]
struct Fib {
    table_one: bool,
    /// Characters in the main document story
    ccp_text: u32,
    fc_clx: u32,
    lcb_clx: u32,
}

impl Fib {
    fn parse(word: &[u8]) -> Result<Self, ExtractionError> {
        let invalid = |what: &str| ExtractionError::Compound(format!("invalid FIB: {}", what));

        if read_u16(word, 0) != Some(WORD_MAGIC) {
            return Err(invalid("bad wIdent"));
        }
        let flags = read_u16(word, 0x0A).ok_or_else(|| invalid("truncated"))?;
        if flags & FLAG_ENCRYPTED != 0 {
            return Err(ExtractionError::Compound("document is encrypted".to_string()));
        }

        // FibBase (32 bytes), then csw + fibRgW, cslw + fibRgLw, cbRgFcLcb + blob
        let csw = read_u16(word, 0x20).ok_or_else(|| invalid("truncated"))? as usize;
        let cslw_at = 0x22 + csw * 2;
        let cslw = read_u16(word, cslw_at).ok_or_else(|| invalid("truncated"))? as usize;
        let rg_lw = cslw_at + 2;
        let ccp_text = read_u32(word, rg_lw + 12).ok_or_else(|| invalid("missing ccpText"))?;

        let cb_at = rg_lw + cslw * 4;
        let pair_count = read_u16(word, cb_at).ok_or_else(|| invalid("truncated"))? as usize;
        if pair_count <= CLX_PAIR_INDEX {
            return Err(invalid("no CLX entry"));
        }
        let clx_at = cb_at + 2 + CLX_PAIR_INDEX * 8;

        Ok(Self {
            table_one: flags & FLAG_WHICH_TABLE != 0,
            ccp_text,
            fc_clx: read_u32(word, clx_at).ok_or_else(|| invalid("missing fcClx"))?,
            lcb_clx: read_u32(word, clx_at + 4).ok_or_else(|| invalid("missing lcbClx"))?,
        })
    }
}

/// One run of contiguous text
#[derive(Debug)]
struct Piece {
    cp_start: u32,
    cp_end: u32,
    fc: u32,
}

fn text_from_streams(fib: &Fib, word: &[u8], table: &[u8]) -> Result<String, ExtractionError> {
    let start = fib.fc_clx as usize;
    let end = start + fib.lcb_clx as usize;
    let clx = table
        .get(start..end)
        .ok_or_else(|| ExtractionError::Compound("CLX outside table stream".to_string()))?;

    let mut text = String::new();
    let mut remaining = fib.ccp_text;

    for piece in parse_pieces(clx)? {
        if remaining == 0 {
            break;
        }
        let count = (piece.cp_end.saturating_sub(piece.cp_start)).min(remaining);
        remaining -= count;
        decode_piece(word, &piece, count as usize, &mut text);
    }

    Ok(clean_text(&text))
}

/// Skip `Prc` entries and parse the `Pcdt` piece table
fn parse_pieces(clx: &[u8]) -> Result<Vec<Piece>, ExtractionError> {
    let malformed = || ExtractionError::Compound("malformed piece table".to_string());
    let mut pos = 0;

    loop {
        match clx.get(pos) {
            Some(0x01) => {
                let size = read_u16(clx, pos + 1).ok_or_else(malformed)? as i16;
                pos += 3 + size.max(0) as usize;
            }
            Some(0x02) => {
                let lcb = read_u32(clx, pos + 1).ok_or_else(malformed)? as usize;
                let plc = clx.get(pos + 5..pos + 5 + lcb).ok_or_else(malformed)?;
                if lcb < 4 || (lcb - 4) % 12 != 0 {
                    return Err(malformed());
                }
                let count = (lcb - 4) / 12;
                let pcd_base = (count + 1) * 4;

                return (0..count)
                    .map(|i| {
                        Ok(Piece {
                            cp_start: read_u32(plc, i * 4).ok_or_else(malformed)?,
                            cp_end: read_u32(plc, (i + 1) * 4).ok_or_else(malformed)?,
                            fc: read_u32(plc, pcd_base + i * 8 + 2).ok_or_else(malformed)?,
                        })
                    })
                    .collect();
            }
            _ => return Err(malformed()),
        }
    }
}

fn decode_piece(word: &[u8], piece: &Piece, count: usize, out: &mut String) {
    if piece.fc & PIECE_COMPRESSED != 0 {
        let offset = ((piece.fc & !PIECE_COMPRESSED) / 2) as usize;
        let bytes = word.get(offset..).unwrap_or_default();
        out.extend(bytes.iter().take(count).map(|&b| cp1252_char(b)));
    } else {
        let offset = piece.fc as usize;
        let bytes = word.get(offset..).unwrap_or_default();
        let units = bytes
            .chunks_exact(2)
            .take(count)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        out.extend(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));
    }
}

/// Map Word's control characters to plain text and drop field codes
fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut field_depth = 0usize;
    let mut in_field_code = false;

    for c in raw.chars() {
        match c {
            // field begin / separator / end
            '\u{13}' => {
                field_depth += 1;
                in_field_code = true;
            }
            '\u{14}' => in_field_code = false,
            '\u{15}' => {
                field_depth = field_depth.saturating_sub(1);
                in_field_code = false;
            }
            _ if in_field_code && field_depth > 0 => {}
            '\r' | '\u{0B}' | '\u{0C}' => out.push('\n'),
            '\u{07}' => out.push('\t'),
            '\t' | '\n' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

/// cp1252 differs from Latin-1 only in 0x80..=0x9F
fn cp1252_char(byte: u8) -> char {
    const HIGH: [char; 32] = [
        '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8D}', 'Ž',
        '\u{8F}', '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{9D}',
        'ž', 'Ÿ',
    ];
    match byte {
        0x80..=0x9F => HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

fn read_u16(buf: &[u8], at: usize) -> Option<u16> {
    buf.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    buf.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Build a minimal single-piece `.doc` holding `text`
#[cfg(test)]
pub(crate) fn build_doc(text: &str, compressed: bool) -> Vec<u8> {
    use std::io::Write;

    const TEXT_AT: usize = 0x400;
    let units: Vec<u16> = text.encode_utf16().collect();

    let mut word = vec![0u8; TEXT_AT];
    word[0..2].copy_from_slice(&WORD_MAGIC.to_le_bytes());
    word[0x20..0x22].copy_from_slice(&14u16.to_le_bytes());
    word[0x3E..0x40].copy_from_slice(&22u16.to_le_bytes());
    word[0x4C..0x50].copy_from_slice(&(units.len() as u32).to_le_bytes());
    word[0x98..0x9A].copy_from_slice(&93u16.to_le_bytes());
    // fcClx = 0, lcbClx = 21 (0x02 + lcb + 2 CPs + 1 PCD)
    word[0x1A6..0x1AA].copy_from_slice(&21u32.to_le_bytes());

    let fc = if compressed {
        word.extend(text.chars().map(|c| c as u8));
        ((TEXT_AT * 2) as u32) | PIECE_COMPRESSED
    } else {
        word.extend(units.iter().flat_map(|u| u.to_le_bytes()));
        TEXT_AT as u32
    };

    let mut table = vec![0x02];
    table.extend(16u32.to_le_bytes());
    table.extend(0u32.to_le_bytes());
    table.extend((units.len() as u32).to_le_bytes());
    table.extend(0u16.to_le_bytes());
    table.extend(fc.to_le_bytes());
    table.extend(0u16.to_le_bytes());

    let mut compound = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut stream = compound.create_stream("WordDocument").unwrap();
        stream.write_all(&word).unwrap();
        stream.flush().unwrap();
    }
    {
        let mut stream = compound.create_stream("0Table").unwrap();
        stream.write_all(&table).unwrap();
        stream.flush().unwrap();
    }
    compound.flush().unwrap();
    compound.into_inner().into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_piece() {
        let doc = build_doc("Hello legacy world\rSecond paragraph\r", true);

        let text = extract_doc_text(&doc).unwrap();

        assert_eq!(text, "Hello legacy world\nSecond paragraph");
    }

    #[test]
    fn test_unicode_piece() {
        let doc = build_doc("Გამარჯობა\u{07}cell\r", false);

        let text = extract_doc_text(&doc).unwrap();

        assert_eq!(text, "Გამარჯობა\tcell");
    }

    #[test]
    fn test_field_codes_are_dropped() {
        let doc = build_doc("See \u{13} HYPERLINK \"x\" \u{14}the link\u{15} here", true);

        let text = extract_doc_text(&doc).unwrap();

        assert_eq!(text, "See the link here");
    }

    #[test]
    fn test_not_a_compound_file() {
        let result = extract_doc_text(b"plain bytes, not OLE");
        assert!(matches!(result, Err(ExtractionError::Compound(_))));
    }

    #[test]
    fn test_cp1252_high_range() {
        assert_eq!(cp1252_char(0x93), '“');
        assert_eq!(cp1252_char(0x80), '€');
        assert_eq!(cp1252_char(b'A'), 'A');
        assert_eq!(cp1252_char(0xE9), 'é');
    }
}
