//! $DWGCODEPAGE to encoding mapping.
//!
//! Files older than AC1021 carry text in a code page named by the header;
//! from AC1021 on everything is UTF-8 and this table is not consulted.

use encoding_rs::Encoding;

/// Get the `encoding_rs` encoding for a DXF code page string.
///
/// Returns `None` when no transcoding is needed (ASCII/UTF-8).
pub fn encoding_from_code_page(code_page: &str) -> Option<&'static Encoding> {
    match code_page.to_ascii_lowercase().as_str() {
        // Asian encodings
        "gb2312" | "ansi_936" => Some(encoding_rs::GBK),
        "big5" | "ansi_950" => Some(encoding_rs::BIG5),
        "korean" | "ansi_949" | "johab" => Some(encoding_rs::EUC_KR),
        "ansi_932" => Some(encoding_rs::SHIFT_JIS),

        // Windows/ANSI code pages
        "ansi_874" => Some(encoding_rs::WINDOWS_874),
        "ansi_1250" => Some(encoding_rs::WINDOWS_1250),
        "ansi_1251" => Some(encoding_rs::WINDOWS_1251),
        "ansi_1252" => Some(encoding_rs::WINDOWS_1252),
        "ansi_1253" => Some(encoding_rs::WINDOWS_1253),
        "ansi_1254" => Some(encoding_rs::WINDOWS_1254),
        "ansi_1255" => Some(encoding_rs::WINDOWS_1255),
        "ansi_1256" => Some(encoding_rs::WINDOWS_1256),
        "ansi_1257" => Some(encoding_rs::WINDOWS_1257),
        "ansi_1258" => Some(encoding_rs::WINDOWS_1258),

        // ISO encodings
        "iso8859-1" | "iso_8859-1" => Some(encoding_rs::WINDOWS_1252),
        "iso8859-2" | "iso_8859-2" => Some(encoding_rs::ISO_8859_2),
        "iso8859-5" | "iso_8859-5" => Some(encoding_rs::ISO_8859_5),
        "iso8859-7" | "iso_8859-7" => Some(encoding_rs::ISO_8859_7),
        "iso8859-9" | "iso_8859-9" => Some(encoding_rs::WINDOWS_1254),

        // Cyrillic
        "koi8-r" => Some(encoding_rs::KOI8_R),
        "koi8-u" => Some(encoding_rs::KOI8_U),

        // ASCII / UTF-8: no fallback needed
        "ascii" | "utf-8" | "utf8" | "unicode" => None,

        // The most common DXF fallback
        _ => Some(encoding_rs::WINDOWS_1252),
    }
}

/// Decode raw bytes: UTF-8 first, then the configured code page, then
/// Latin-1 byte-to-char as the last resort.
pub fn decode_text(bytes: &[u8], encoding: Option<&'static Encoding>) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            if let Some(enc) = encoding {
                let (decoded, _, _) = enc.decode(bytes);
                decoded.into_owned()
            } else {
                bytes.iter().map(|&b| b as char).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_1252() {
        assert_eq!(
            encoding_from_code_page("ANSI_1252"),
            Some(encoding_rs::WINDOWS_1252)
        );
    }

    #[test]
    fn test_utf8_needs_no_transcoding() {
        assert_eq!(encoding_from_code_page("UTF-8"), None);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xE9 is 'é' in Latin-1 and invalid standalone UTF-8
        assert_eq!(decode_text(&[0x61, 0xE9], None), "aé");
    }

    #[test]
    fn test_decode_with_code_page() {
        let enc = encoding_from_code_page("ANSI_1251");
        // 0xC0 is 'А' in Windows-1251
        assert_eq!(decode_text(&[0xC0], enc), "А");
    }
}
