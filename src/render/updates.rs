use crate::model::{UpdateRecord, UpdateSection};
use crate::render::{EmptyState, ListRenderer};
use crate::util::escape_html;

pub const EMPTY_UPDATES: EmptyState = EmptyState {
    title: "Nu există update-uri",
    hint: Some("Adaugă primul update folosind butonul de mai sus"),
};

/// Display-ready update. Also built from the edit form for the live preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateCardView {
    pub version: String,
    pub date_text: String,
    pub title: String,
    pub description: String,
    pub sections: Vec<SectionView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionView {
    pub icon: String,
    pub title: String,
    pub items: Vec<String>,
}

impl From<&UpdateSection> for SectionView {
    fn from(section: &UpdateSection) -> Self {
        Self {
            icon: section.icon.clone(),
            title: section.title.clone(),
            items: section.items.clone(),
        }
    }
}

impl From<&UpdateRecord> for UpdateCardView {
    fn from(update: &UpdateRecord) -> Self {
        Self {
            version: update.version.clone(),
            date_text: update.date_text.clone(),
            title: update.title.clone(),
            description: update.description.clone(),
            sections: update.sections.iter().map(SectionView::from).collect(),
        }
    }
}

/// Section boxes of a public card. Sections with no items are skipped.
pub fn sections_html(sections: &[SectionView]) -> String {
    sections
        .iter()
        .filter(|s| !s.items.is_empty())
        .map(|s| {
            let items: String = s
                .items
                .iter()
                .map(|item| format!("<li>{}</li>", escape_html(item)))
                .collect();
            format!(
                r#"<div class="update-list-box"><h4>{} {}</h4><ul>{items}</ul></div>"#,
                escape_html(&s.icon),
                escape_html(&s.title)
            )
        })
        .collect()
}

pub fn public_card_html(view: &UpdateCardView) -> String {
    format!(
        r#"<article class="update-card"><div class="update-meta"><span class="version-badge">{}</span><span class="date-text">{}</span></div><h3>{}</h3><p>{}</p>{}</article>"#,
        escape_html(&view.version),
        escape_html(&view.date_text),
        escape_html(&view.title),
        escape_html(&view.description),
        sections_html(&view.sections)
    )
}

fn public_card(update: &UpdateRecord) -> String {
    public_card_html(&UpdateCardView::from(update))
}

/// Admin list card with edit and delete actions keyed by id.
pub fn admin_card(update: &UpdateRecord) -> String {
    let id = escape_html(&update.id);
    format!(
        r#"<div class="admin-update-card" data-id="{id}"><div class="update-info"><div class="update-meta"><span class="version-badge">{}</span><span class="date-text">{}</span></div><h3>{}</h3><p>{}</p></div><div class="update-actions"><button class="btn btn-icon" data-action="edit" data-id="{id}" title="Editează">✎</button><button class="btn btn-icon danger" data-action="delete" data-id="{id}" title="Șterge">✕</button></div></div>"#,
        escape_html(&update.version),
        escape_html(&update.date_text),
        escape_html(&update.title),
        escape_html(&update.description)
    )
}

pub const fn admin_list() -> ListRenderer<UpdateRecord> {
    ListRenderer::new(EMPTY_UPDATES, admin_card)
}

pub const fn public_list() -> ListRenderer<UpdateRecord> {
    ListRenderer::new(EMPTY_UPDATES, public_card)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UpdateRecord {
        UpdateRecord {
            id: "update-1".into(),
            version: "v2.1.0".into(),
            date_text: "3 Martie 2025".into(),
            title: "Patch <mare>".into(),
            description: "Multe schimbări".into(),
            sections: vec![
                UpdateSection {
                    icon: "🚗".into(),
                    title: "Vehicule".into(),
                    items: vec!["Sultan RS".into(), "Elegy".into()],
                },
                UpdateSection {
                    icon: "🐛".into(),
                    title: "Bug fixes".into(),
                    items: vec![],
                },
            ],
        }
    }

    #[test]
    fn admin_card_carries_id_on_actions_and_escapes() {
        let html = admin_card(&sample());
        assert!(html.contains(r#"data-action="edit" data-id="update-1""#));
        assert!(html.contains(r#"data-action="delete" data-id="update-1""#));
        assert!(html.contains("Patch &lt;mare&gt;"));
    }

    #[test]
    fn public_card_skips_sections_without_items() {
        let html = public_card(&sample());
        assert!(html.contains("<h4>🚗 Vehicule</h4><ul><li>Sultan RS</li><li>Elegy</li></ul>"));
        assert!(!html.contains("Bug fixes"));
    }

    #[test]
    fn empty_list_uses_update_empty_state() {
        let html = admin_list().view(&[]).to_html();
        assert!(html.contains("Nu există update-uri"));
    }
}
