/// Content type from leading magic bytes. The declared extension plays no
/// part here.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    if bytes.starts_with(b"%PDF-") {
        return "application/pdf";
    }
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.contains('\0') => "text/plain",
        Ok(_) => "application/octet-stream",
        Err(_) if bytes.iter().all(|&b| is_text_byte(b)) => "text/plain",
        Err(_) => "application/octet-stream",
    }
}

/// Printable ASCII, common whitespace, or a high byte from an 8-bit
/// encoding such as Latin-1.
fn is_text_byte(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b | 0x20..=0x7e | 0x80..=0xff)
}

pub fn is_allowed_mime(mime: &str) -> bool {
    matches!(mime, "text/plain" | "text/markdown" | "application/pdf") || mime.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_signatures_are_recognised() {
        assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), "image/png");
        assert_eq!(sniff_mime(b"GIF89a\x01\0\x01\0"), "image/gif");
        assert_eq!(sniff_mime(b"\xff\xd8\xff\xe0\0\x10JFIF"), "image/jpeg");
    }

    #[test]
    fn pdf_and_text_are_recognised() {
        assert_eq!(sniff_mime(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(sniff_mime("# Notes\nplain *markdown*".as_bytes()), "text/plain");
    }

    #[test]
    fn binary_blobs_are_opaque() {
        assert_eq!(sniff_mime(b"PK\x03\x04\x14\0\x06\0"), "application/octet-stream");
        assert_eq!(sniff_mime(b"MZ\x90\0\x03\0\0\0"), "application/octet-stream");
        assert_eq!(sniff_mime(b"text\0with nul"), "application/octet-stream");
        assert_eq!(sniff_mime(b"\xfe\x01\x02\x03"), "application/octet-stream");
    }

    #[test]
    fn eight_bit_text_is_plain_text() {
        assert_eq!(sniff_mime(b"caf\xe9 au lait\r\n"), "text/plain");
        assert_eq!(sniff_mime(b"na\xefve\tr\xe9sum\xe9"), "text/plain");
    }

    #[test]
    fn allow_list_accepts_any_image() {
        assert!(is_allowed_mime("image/webp"));
        assert!(is_allowed_mime("text/plain"));
        assert!(!is_allowed_mime("application/octet-stream"));
        assert!(!is_allowed_mime("application/zip"));
    }
}
