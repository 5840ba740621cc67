// Byte-to-text decoding for uploaded exports

/// Decode raw upload bytes. UTF-8 first (BOM stripped); on failure fall back
/// to Windows-1252, which is what spreadsheet tools on field laptops emit.
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Guess the delimiter of a header-first table.
///
/// The header row fixes the column count for each candidate; data rows that
/// agree with it add to the score. A candidate that leaves the header as a
/// single column is never chosen. Records are read with quoting honoured, so
/// a quoted remark spanning lines counts as one row. Defaults to `,`.
pub fn sniff_delimiter(table: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
    const SAMPLE_ROWS: usize = 10;

    let mut best = (b',', 0usize);
    for delimiter in CANDIDATES {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(table.as_bytes());
        let mut widths = reader.records().take(SAMPLE_ROWS).map_while(Result::ok).map(|r| r.len());

        let columns = match widths.next() {
            Some(n) if n > 1 => n,
            _ => continue,
        };
        let agreeing = 1 + widths.filter(|&w| w == columns).count();
        let score = agreeing * columns;
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}
