use maud::{html, Markup, DOCTYPE};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }
h1, h2 { color: #333; }
.stats-container { display: flex; flex-wrap: wrap; gap: 20px; margin-bottom: 2em; }
.stat-box { border: 1px solid #ddd; padding: 15px; border-radius: 5px; min-width: 200px; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
footer { margin-top: 2em; color: #777; font-size: 0.9em; }
";

/// Standalone page: everything inline, no external assets.
pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (STYLE) }
            }
            body {
                header {
                    h1 { (title) }
                }
                (content)
            }
        }
    }
}
