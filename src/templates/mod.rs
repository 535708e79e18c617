//! Template renderer – pure functions from [`ResumeData`] to a visual
//! document tree.
//!
//! Every variant honours the same rules: empty collections produce no
//! section at all, skill levels map to one to four stars, ongoing positions
//! end in "Present" and dates are shown exactly as stored.

mod classic;
mod creative;
mod modern;
mod preview;

use crate::dom::{div, icon, span, ElementNode};
use crate::model::{Experience, PersonalInfo, ResumeData, Skill, SkillLevel, TemplateId};

pub use preview::{
    preview_container, preview_document, PreviewMode, PREVIEW_ID, PREVIEW_MIN_HEIGHT_PX,
    PREVIEW_WIDTH_PX,
};

/// Shared signature of every template variant.
pub type RenderFn = fn(&ResumeData) -> ElementNode;

impl TemplateId {
    pub fn renderer(self) -> RenderFn {
        match self {
            TemplateId::Modern => modern::render,
            TemplateId::Classic => classic::render,
            TemplateId::Creative => creative::render,
        }
    }
}

/// Render `data` with the given template.
pub fn render(data: &ResumeData, template: TemplateId) -> ElementNode {
    template.renderer()(data)
}

/// Render by stored template name; unknown names render as `modern`.
pub fn render_named(data: &ResumeData, name: &str) -> ElementNode {
    render(data, TemplateId::parse(name))
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

/// Group skills by exact category, groups ordered by first appearance.
pub fn group_skills(skills: &[Skill]) -> Vec<(&str, Vec<&Skill>)> {
    let mut groups: Vec<(&str, Vec<&Skill>)> = Vec::new();
    for skill in skills {
        match groups.iter_mut().find(|(c, _)| *c == skill.category) {
            Some((_, members)) => members.push(skill),
            None => groups.push((skill.category.as_str(), vec![skill])),
        }
    }
    groups
}

pub const MAX_STARS: u8 = 4;

pub fn star_count(level: &SkillLevel) -> u8 {
    level.stars()
}

/// "Present" for ongoing positions, otherwise the stored end date verbatim.
pub fn end_date_label(exp: &Experience) -> &str {
    if exp.current {
        "Present"
    } else {
        &exp.end_date
    }
}

pub fn date_range(start: &str, end: &str) -> String {
    format!("{start} - {end}")
}

/// Non-empty optional text.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Contact line entries as (icon, label). LinkedIn shows a label, not the URL.
fn contact_items(info: &PersonalInfo) -> Vec<(&'static str, &str)> {
    [
        ("mail", info.email.as_str()),
        ("phone", info.phone.as_str()),
        ("map-pin", info.location.as_str()),
        ("globe", info.website.as_str()),
        ("linkedin", if info.linkedin.is_empty() { "" } else { "LinkedIn" }),
    ]
    .into_iter()
    .filter(|(_, text)| !text.is_empty())
    .collect()
}

/// Four stars, the first `star_count(level)` filled.
fn star_rating(level: &SkillLevel, filled_color: &str, empty_color: &str) -> ElementNode {
    let filled = star_count(level);
    div("flex items-center").children((0..MAX_STARS).map(|i| {
        if i < filled {
            icon("star", &format!("star-filled w-3 h-3 {filled_color}"))
        } else {
            icon("star", &format!("star-empty w-3 h-3 {empty_color}"))
        }
    }))
}

/// Link / GitHub markers next to a project name.
fn project_links(link: Option<&str>, github: Option<&str>, link_color: &str) -> Option<ElementNode> {
    if link.is_none() && github.is_none() {
        return None;
    }
    let mut row = div("flex gap-2");
    if link.is_some() {
        row.push(icon("external-link", &format!("w-4 h-4 {link_color}")));
    }
    if github.is_some() {
        row.push(icon("github", "w-4 h-4 text-gray-600"));
    }
    Some(row)
}

/// Ordered technology badges; `None` for an empty list.
fn tech_badges(technologies: &[String], badge_classes: &str) -> Option<ElementNode> {
    if technologies.is_empty() {
        return None;
    }
    Some(
        div("flex flex-wrap gap-2")
            .children(technologies.iter().map(|t| span(badge_classes, t.as_str()))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Tag;
    use crate::samples::sample_resume;

    fn skill(name: &str, category: &str) -> Skill {
        Skill {
            name: name.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let skills = vec![
            skill("Rust", "Languages"),
            skill("Docker", "Tools"),
            skill("Go", "Languages"),
            skill("git", "tools"),
        ];
        let groups = group_skills(&skills);
        let order: Vec<_> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec!["Languages", "Tools", "tools"]);
        assert_eq!(groups[0].1.len(), 2);
        let total: usize = groups.iter().map(|(_, s)| s.len()).sum();
        assert_eq!(total, skills.len());
    }

    #[test]
    fn current_experience_ends_in_present() {
        let exp = Experience {
            current: true,
            end_date: "2021-05".into(),
            ..Default::default()
        };
        assert_eq!(end_date_label(&exp), "Present");
        let past = Experience {
            end_date: "".into(),
            ..Default::default()
        };
        assert_eq!(end_date_label(&past), "");
    }

    #[test]
    fn star_counts() {
        assert_eq!(star_count(&SkillLevel::Expert), 4);
        assert_eq!(star_count(&SkillLevel::Intermediate), 2);
        assert_eq!(star_count(&SkillLevel::parse("Guru")), 1);
    }

    #[test]
    fn stars_mark_filled_and_empty() {
        let rating = star_rating(&SkillLevel::Advanced, "text-blue-500", "text-gray-300");
        let filled = rating.find_all(&|e| e.has_class("star-filled")).len();
        let empty = rating.find_all(&|e| e.has_class("star-empty")).len();
        assert_eq!((filled, empty), (3, 1));
    }

    #[test]
    fn unknown_template_renders_modern() {
        let data = sample_resume();
        let modern = render(&data, TemplateId::Modern);
        assert_eq!(render_named(&data, "retro"), modern);
        assert_eq!(render_named(&data, ""), modern);
        assert_ne!(render_named(&data, "classic"), modern);
    }

    #[test]
    fn empty_resume_renders_without_sections() {
        let data = ResumeData::default();
        for template in TemplateId::ALL {
            let root = render(&data, template);
            let headings = root.find_all(&|e| e.tag == Tag::H2);
            for h in headings {
                let text = h.text_content();
                assert!(
                    !matches!(text.as_str(), "Education" | "Skills" | "Projects")
                        && !text.contains("Experience"),
                    "{template}: unexpected heading {text}"
                );
            }
        }
    }

    #[test]
    fn empty_optional_fields_are_hidden() {
        let mut data = sample_resume();
        data.personal_info.linkedin.clear();
        for edu in &mut data.education {
            edu.gpa = Some(String::new());
        }
        for project in &mut data.projects {
            project.technologies.clear();
            project.link = None;
            project.github = Some(String::new());
        }
        for template in TemplateId::ALL {
            let text = render(&data, template).text_content();
            assert!(!text.contains("LinkedIn"), "{template}");
            assert!(!text.contains("GPA"), "{template}");
        }
        let modern = render(&data, TemplateId::Modern);
        let github_icons =
            modern.find_all(&|e| e.attributes.get("data-icon").map(String::as_str) == Some("github"));
        assert!(github_icons.is_empty());
    }
}
