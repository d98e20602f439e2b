/// Turn a stored image reference into an absolute URL.
///
/// Absolute `http(s)` URLs pass through untouched; bare filenames are served
/// from `<base_url>/media/products/`.
pub fn product_image_url(base_url: &str, stored: &str) -> String {
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return stored.to_string();
    }
    let file = stored.trim_start_matches('/');
    format!("{}/media/products/{file}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_filenames_are_prefixed() {
        assert_eq!(
            product_image_url("http://localhost:3333", "shirt.png"),
            "http://localhost:3333/media/products/shirt.png"
        );
        assert_eq!(
            product_image_url("http://localhost:3333/", "/shirt.png"),
            "http://localhost:3333/media/products/shirt.png"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let url = "https://cdn.example.com/a.png";
        assert_eq!(product_image_url("http://localhost:3333", url), url);
        let url = "http://cdn.example.com/b.png";
        assert_eq!(product_image_url("http://localhost:3333", url), url);
    }
}
