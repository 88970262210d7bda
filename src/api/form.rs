//! Browser upload page

use axum::response::Html;

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>EML to PDF</title>
</head>
<body>
<h1>Convert an email to PDF</h1>
<form action="/convert" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept=".eml" required>
<button type="submit">Convert</button>
</form>
</body>
</html>
"#;

/// Minimal page for converting a file by hand
pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}
