//! The CDX field-order descriptor and line codec.

use super::{dates, CdxEntry, CdxParseError, CdxWriteError};

/// One field of a CDX line, identified by its legend code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdxField {
    /// `a`: the original URL.
    Url,
    /// `A`: the canonicalized URL.
    UrlNormalized,
    /// `b`: the capture date as a 14-digit wayback timestamp.
    Date,
    /// `m`: the content type.
    ContentType,
    /// `s`: the HTTP status code.
    StatusCode,
    /// `k`: the content digest.
    Digest,
    /// `r`: the redirect target.
    Redirect,
    /// `g`: the container file name.
    Filename,
    /// `V`: the byte offset of the record in its container (`v` accepted
    /// as an alias when reading).
    Offset,
}

impl CdxField {
    /// The legend code written in a format line.
    pub fn code(self) -> char {
        use CdxField::*;
        match self {
            Url => 'a',
            UrlNormalized => 'A',
            Date => 'b',
            ContentType => 'm',
            StatusCode => 's',
            Digest => 'k',
            Redirect => 'r',
            Filename => 'g',
            Offset => 'V',
        }
    }

    /// Resolve a legend code found in a format line.
    pub fn from_code(code: char) -> Option<CdxField> {
        use CdxField::*;
        Some(match code {
            'a' => Url,
            'A' => UrlNormalized,
            'b' => Date,
            'm' => ContentType,
            's' => StatusCode,
            'k' => Digest,
            'r' => Redirect,
            'g' => Filename,
            'v' | 'V' => Offset,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        use CdxField::*;
        match self {
            Url => "url",
            UrlNormalized => "normalized url",
            Date => "date",
            ContentType => "content type",
            StatusCode => "status",
            Digest => "digest",
            Redirect => "redirect",
            Filename => "filename",
            Offset => "offset",
        }
    }
}

/// An ordered field-position descriptor for CDX lines.
///
/// A format owns the mapping between line columns and [`CdxEntry`] fields in
/// both directions: [`parse_line`](Self::parse_line) and
/// [`format_line`](Self::format_line). For any entry `e` and format `F`
/// containing every field, `F.parse_line(&F.format_line(&e)?)? == e`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdxFormat {
    fields: Vec<CdxField>,
}

impl CdxFormat {
    /// The canonical field order: `a A b m s k r g V`.
    pub fn canonical() -> CdxFormat {
        use CdxField::*;
        CdxFormat {
            fields: vec![
                Url,
                UrlNormalized,
                Date,
                ContentType,
                StatusCode,
                Digest,
                Redirect,
                Filename,
                Offset,
            ],
        }
    }

    /// The fields of this format in line order.
    pub fn fields(&self) -> &[CdxField] {
        &self.fields
    }

    /// Whether a line looks like a CDX format line rather than a data line.
    pub fn is_header_line(line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed == "CDX" || trimmed.starts_with("CDX ")
    }

    /// Parse a format line such as `CDX a A b m s k r g V`.
    pub fn parse_header_line(line: &str) -> Result<CdxFormat, CdxParseError> {
        let invalid = || {
            let mut near: String = line.chars().take(24).collect();
            if near.len() < line.len() {
                near.push_str("...");
            }
            CdxParseError::InvalidFormatLine(near)
        };

        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("CDX") {
            return Err(invalid());
        }
        let mut fields = Vec::new();
        for token in tokens {
            let mut chars = token.chars();
            let code = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(invalid()),
            };
            fields.push(CdxField::from_code(code).ok_or(CdxParseError::UnknownFieldCode(code))?);
        }
        if fields.is_empty() {
            return Err(invalid());
        }
        Ok(CdxFormat { fields })
    }

    /// Render the format line for this field order.
    pub fn header_line(&self) -> String {
        let mut line = String::from("CDX");
        for field in &self.fields {
            line.push(' ');
            line.push(field.code());
        }
        line
    }

    /// Parse one CDX data line according to this format.
    ///
    /// A literal `-` means the field is empty; empty required fields are an
    /// error since the record model has no partially-populated entries.
    pub fn parse_line(&self, line: &str) -> Result<CdxEntry, CdxParseError> {
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() != self.fields.len() {
            return Err(CdxParseError::FieldCountMismatch {
                expected: self.fields.len(),
                found: values.len(),
            });
        }

        let mut url = None;
        let mut url_normalized = None;
        let mut capture_time = None;
        let mut content_type = None;
        let mut http_status = None;
        let mut digest = None;
        let mut redirect_url = None;
        let mut container_filename = None;
        let mut file_offset = None;

        for (&field, &raw) in self.fields.iter().zip(&values) {
            let value = if raw == "-" { None } else { Some(raw) };
            let malformed = |value: &str| CdxParseError::MalformedField {
                field: field.name(),
                value: value.to_owned(),
            };
            match field {
                CdxField::Url => url = value.map(str::to_owned),
                CdxField::UrlNormalized => url_normalized = value.map(str::to_owned),
                CdxField::Date => {
                    if let Some(v) = value {
                        capture_time =
                            Some(dates::parse_wayback(v).map_err(|_| malformed(v))?);
                    }
                }
                CdxField::ContentType => content_type = value.map(str::to_owned),
                CdxField::StatusCode => {
                    if let Some(v) = value {
                        http_status = Some(v.parse::<u16>().map_err(|_| malformed(v))?);
                    }
                }
                CdxField::Digest => digest = value.map(str::to_owned),
                CdxField::Redirect => redirect_url = value.map(str::to_owned),
                CdxField::Filename => container_filename = value.map(str::to_owned),
                CdxField::Offset => {
                    if let Some(v) = value {
                        file_offset = Some(v.parse::<u64>().map_err(|_| malformed(v))?);
                    }
                }
            }
        }

        Ok(CdxEntry {
            url: url.ok_or(CdxParseError::MissingField("url"))?,
            url_normalized: url_normalized
                .ok_or(CdxParseError::MissingField("normalized url"))?,
            capture_time: capture_time.ok_or(CdxParseError::MissingField("date"))?,
            content_type,
            http_status,
            digest: digest.ok_or(CdxParseError::MissingField("digest"))?,
            redirect_url,
            container_filename: container_filename
                .ok_or(CdxParseError::MissingField("filename"))?,
            file_offset: file_offset.ok_or(CdxParseError::MissingField("offset"))?,
        })
    }

    /// Serialize an entry as one CDX line according to this format.
    ///
    /// Absent optional values are written as `-`; an empty required value is
    /// rejected rather than emitting a malformed line.
    pub fn format_line(&self, entry: &CdxEntry) -> Result<String, CdxWriteError> {
        fn optional(value: &Option<String>) -> &str {
            match value {
                Some(v) if !v.is_empty() => v,
                _ => "-",
            }
        }
        fn required<'a>(
            value: &'a str,
            field: &'static str,
        ) -> Result<&'a str, CdxWriteError> {
            if value.is_empty() {
                Err(CdxWriteError::MissingField(field))
            } else {
                Ok(value)
            }
        }

        let mut parts: Vec<String> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let part = match field {
                CdxField::Url => required(&entry.url, "url")?.to_owned(),
                CdxField::UrlNormalized => {
                    required(&entry.url_normalized, "normalized url")?.to_owned()
                }
                CdxField::Date => dates::format_wayback(&entry.capture_time),
                CdxField::ContentType => optional(&entry.content_type).to_owned(),
                CdxField::StatusCode => match entry.http_status {
                    Some(status) => status.to_string(),
                    None => "-".to_owned(),
                },
                CdxField::Digest => required(&entry.digest, "digest")?.to_owned(),
                CdxField::Redirect => optional(&entry.redirect_url).to_owned(),
                CdxField::Filename => {
                    required(&entry.container_filename, "filename")?.to_owned()
                }
                CdxField::Offset => entry.file_offset.to_string(),
            };
            parts.push(part);
        }
        Ok(parts.join(" "))
    }
}

impl Default for CdxFormat {
    fn default() -> Self {
        CdxFormat::canonical()
    }
}
