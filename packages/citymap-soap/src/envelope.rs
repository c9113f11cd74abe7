//! SOAP 1.1 request construction and the text scan used on responses.
//!
//! Requests use implicit types and carry no `id`/`root` adornments. Responses
//! are not parsed as XML: only the text between `<ImageInBase64>` and
//! `</ImageInBase64>` is consumed, which is all the service contract promises.
use std::borrow::Cow;
use std::fmt;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_ENC_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Element carrying the base64 image in every service response.
pub const IMAGE_TAG: &str = "ImageInBase64";

#[derive(Debug, Clone, PartialEq)]
pub enum SoapValue {
    Int(i32),
    Text(String),
}

impl fmt::Display for SoapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoapValue::Int(v) => write!(f, "{}", v),
            SoapValue::Text(s) => f.write_str(&escape_xml(s)),
        }
    }
}

/// A named, namespaced property of the request element.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapParam {
    pub name: &'static str,
    pub value: SoapValue,
}

impl SoapParam {
    pub fn new(name: &'static str, value: SoapValue) -> Self {
        Self { name, value }
    }
}

/// Renders a float the way the service expects: never in integer form.
pub fn format_coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Builds the request envelope for `method` in `namespace`.
pub fn build_envelope(namespace: &str, method: &str, params: &[SoapParam]) -> String {
    let mut body = String::new();
    for param in params {
        body.push_str(&format!(
            "<n0:{name}>{value}</n0:{name}>",
            name = param.name,
            value = param.value
        ));
    }

    format!(
        concat!(
            "<v:Envelope xmlns:i=\"{xsi}\" xmlns:d=\"{xsd}\" xmlns:c=\"{enc}\" xmlns:v=\"{env}\">",
            "<v:Header />",
            "<v:Body>",
            "<n0:{method} xmlns:n0=\"{ns}\">{body}</n0:{method}>",
            "</v:Body>",
            "</v:Envelope>"
        ),
        xsi = XSI_NS,
        xsd = XSD_NS,
        enc = SOAP_ENC_NS,
        env = SOAP_ENV_NS,
        method = method,
        ns = escape_xml(namespace),
        body = body,
    )
}

/// Returns the trimmed text between `<tag>` and the first `</tag>`.
///
/// `None` when either delimiter is missing or the closing tag does not follow
/// the opening one.
pub fn extract_tag<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);

    let start = xml.find(&start_tag)?;
    let end = xml.find(&end_tag)?;
    if end <= start {
        return None;
    }

    xml.get(start + start_tag.len()..end).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://citymapsoap.com/service/";

    #[test]
    fn test_envelope_without_params() {
        let xml = build_envelope(NS, "GetInitialMap", &[]);
        assert!(xml.starts_with("<v:Envelope "));
        assert!(xml.contains(&format!("xmlns:v=\"{}\"", SOAP_ENV_NS)));
        assert!(xml.contains(
            "<v:Body><n0:GetInitialMap xmlns:n0=\"http://citymapsoap.com/service/\"></n0:GetInitialMap></v:Body>"
        ));
        assert!(!xml.contains("c:root"));
    }

    #[test]
    fn test_envelope_with_params() {
        let params = [
            SoapParam::new("X1", SoapValue::Int(10)),
            SoapParam::new("Lat1", SoapValue::Text("52.2297".into())),
        ];
        let xml = build_envelope(NS, "GetFragmentOfMap", &params);
        assert!(xml.contains("<n0:X1>10</n0:X1><n0:Lat1>52.2297</n0:Lat1>"));
        assert!(xml.ends_with("</n0:GetFragmentOfMap></v:Body></v:Envelope>"));
    }

    #[test]
    fn test_text_values_are_escaped() {
        let params = [SoapParam::new("Lat1", SoapValue::Text("<1&2>".into()))];
        let xml = build_envelope(NS, "M", &params);
        assert!(xml.contains("<n0:Lat1>&lt;1&amp;2&gt;</n0:Lat1>"));
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(21.0), "21.0");
        assert_eq!(format_coordinate(-90.0), "-90.0");
        assert_eq!(format_coordinate(52.2297), "52.2297");
        assert_eq!(format_coordinate(0.5), "0.5");
    }

    #[test]
    fn test_extract_tag_found() {
        let body = "<s:Envelope><s:Body><R><ImageInBase64>\n  Zm9v \n</ImageInBase64></R></s:Body></s:Envelope>";
        assert_eq!(extract_tag(body, IMAGE_TAG), Some("Zm9v"));
    }

    #[test]
    fn test_extract_tag_missing() {
        assert_eq!(extract_tag("<Other>abc</Other>", IMAGE_TAG), None);
        assert_eq!(extract_tag("<ImageInBase64>abc", IMAGE_TAG), None);
        assert_eq!(extract_tag("abc</ImageInBase64>", IMAGE_TAG), None);
    }

    #[test]
    fn test_extract_tag_end_before_start() {
        let body = "</ImageInBase64>junk<ImageInBase64>abc";
        assert_eq!(extract_tag(body, IMAGE_TAG), None);
    }

    #[test]
    fn test_extract_tag_empty_value() {
        assert_eq!(extract_tag("<ImageInBase64></ImageInBase64>", IMAGE_TAG), Some(""));
    }
}
