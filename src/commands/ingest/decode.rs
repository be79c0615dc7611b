use super::*;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Debug, Clone, Copy)]
enum EncodingCandidate {
    Requested(&'static Encoding),
    Utf8WithBom,
    Utf8,
    Windows1252,
    Latin1,
}

impl EncodingCandidate {
    fn label(self) -> &'static str {
        match self {
            Self::Requested(encoding) => encoding.name(),
            Self::Utf8WithBom => "utf-8-sig",
            Self::Utf8 => "utf-8",
            Self::Windows1252 => "windows-1252",
            Self::Latin1 => "latin-1",
        }
    }

    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Requested(encoding) => {
                let body = if encoding == UTF_8 {
                    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
                } else {
                    bytes
                };
                encoding
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            Self::Utf8WithBom => {
                let body = bytes.strip_prefix(UTF8_BOM)?;
                std::str::from_utf8(body).ok().map(ToOwned::to_owned)
            }
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(ToOwned::to_owned),
            Self::Windows1252 => {
                if bytes.iter().any(|byte| CP1252_UNDEFINED.contains(byte)) {
                    return None;
                }
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
            Self::Latin1 => Some(bytes.iter().map(|&byte| char::from(byte)).collect()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub text: String,
    pub encoding: &'static str,
}

pub fn read_clippings_file(path: &Path, requested: Option<&str>) -> Result<DecodedFile> {
    if !path.exists() {
        bail!("input file does not exist: {}", path.display());
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_clippings_bytes(&bytes, requested)
        .with_context(|| format!("failed to decode {}", path.display()))
}

pub fn decode_clippings_bytes(bytes: &[u8], requested: Option<&str>) -> Result<DecodedFile> {
    let mut candidates = Vec::with_capacity(5);
    if let Some(label) = requested.map(str::trim).filter(|label| !label.is_empty()) {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => candidates.push(EncodingCandidate::Requested(encoding)),
            None => warn!(encoding = %label, "unknown encoding label, trying defaults"),
        }
    }
    candidates.extend([
        EncodingCandidate::Utf8WithBom,
        EncodingCandidate::Utf8,
        EncodingCandidate::Windows1252,
        EncodingCandidate::Latin1,
    ]);

    for candidate in candidates {
        match candidate.decode(bytes) {
            Some(text) => {
                debug!(encoding = candidate.label(), "decoded clippings file");
                return Ok(DecodedFile {
                    text,
                    encoding: candidate.label(),
                });
            }
            None => debug!(encoding = candidate.label(), "encoding candidate rejected"),
        }
    }

    bail!("no encoding candidate could decode the input")
}
