use maud::{html, Markup};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="stat-box" {
            h2 { (title) }
            (body)
        }
    }
}

/// `label: count` bullet list, in the order given.
pub fn count_list(counts: &[(String, usize)]) -> Markup {
    html! {
        ul {
            @for (label, count) in counts {
                li { (label) ": " (count) }
            }
        }
    }
}
