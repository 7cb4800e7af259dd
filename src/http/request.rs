use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// One request against the source site.
///
/// Form parameters keep their insertion order: the site uses repeated keys
/// (`section_data[]`) whose order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub form: Vec<(String, String)>,
    /// Ask for the XHR flavour of the page (JSON envelope instead of full HTML).
    pub xhr: bool,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            form: Vec::new(),
            xhr: false,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            form: Vec::new(),
            xhr: true,
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    /// Normalized signature used as the fetch cache key.
    pub fn signature(&self) -> String {
        let form = self
            .form
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{} {} {}", self.method, self.url.trim_end_matches('/'), form)
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if !self.form.is_empty() {
            write!(f, " [{}]", self.form.len())?;
        }
        Ok(())
    }
}
