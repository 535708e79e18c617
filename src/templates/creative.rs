//! Creative: purple gradient sidebar with avatar, contact, skills and
//! education; a main column with a timeline of positions and project cards.

use crate::dom::{div, icon, section, span, text_el, ElementNode, Tag};
use crate::model::{Education, Experience, PersonalInfo, Project, ResumeData, Skill};

use super::{
    contact_items, date_range, end_date_label, group_skills, present, project_links, star_rating,
    tech_badges, PREVIEW_MIN_HEIGHT_PX,
};

const SIDEBAR_HEADING: &str = "text-lg font-semibold mb-4 border-b border-purple-400 pb-2";
const MAIN_HEADING: &str = "text-2xl font-bold text-purple-800 mb-2";

pub(super) fn render(data: &ResumeData) -> ElementNode {
    let sidebar = div("flex-1 bg-gradient-to-b from-purple-600 to-purple-800 text-white p-8")
        .child(identity(&data.personal_info))
        .child_opt(contact_section(&data.personal_info))
        .child_opt(skills_section(&data.skills))
        .child_opt(education_section(&data.education));

    let main = div("flex-2 p-8 flex flex-col gap-8")
        .child_opt(about_section(&data.personal_info))
        .child_opt(experience_section(&data.experience))
        .child_opt(projects_section(&data.projects));

    div("bg-white text-gray-800 font-sans").child(
        div("flex")
            .style(&format!("min-height: {PREVIEW_MIN_HEIGHT_PX}px"))
            .child(sidebar)
            .child(main),
    )
}

/// Avatar initial, or nothing for an unnamed resume.
fn initial(full_name: &str) -> String {
    full_name
        .trim_start()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

fn identity(info: &PersonalInfo) -> ElementNode {
    div("text-center mb-8 flex flex-col items-center")
        .child(
            div("w-32 h-32 bg-white bg-opacity-20 rounded-full mb-4 flex items-center justify-center")
                .child(span("text-4xl font-bold", initial(&info.full_name))),
        )
        .child(text_el(Tag::H1, "text-2xl font-bold mb-2", info.full_name.as_str()))
}

fn sidebar_heading(title: &str) -> ElementNode {
    text_el(Tag::H2, SIDEBAR_HEADING, title)
}

fn contact_section(info: &PersonalInfo) -> Option<ElementNode> {
    let items = contact_items(info);
    if items.is_empty() {
        return None;
    }
    let rows = items.into_iter().map(|(kind, label)| {
        div("flex items-center text-sm")
            .child(icon(kind, "w-4 h-4 mr-3"))
            .child(span("", label))
    });
    Some(
        div("mb-8")
            .child(sidebar_heading("Contact"))
            .child(div("flex flex-col gap-3").children(rows)),
    )
}

fn skills_section(skills: &[Skill]) -> Option<ElementNode> {
    let groups = group_skills(skills);
    if groups.is_empty() {
        return None;
    }
    let blocks = groups.into_iter().map(|(category, members)| {
        let rows = members.into_iter().map(|skill| {
            div("flex items-center justify-between")
                .child(span("text-sm", skill.name.as_str()))
                .child(star_rating(&skill.level, "text-yellow-300", "text-purple-300"))
        });
        div("")
            .child(text_el(
                Tag::H3,
                "font-medium text-purple-200 text-sm mb-2 capitalize",
                category,
            ))
            .child(div("flex flex-col gap-2").children(rows))
    });
    Some(
        div("mb-8")
            .child(sidebar_heading("Skills"))
            .child(div("flex flex-col gap-4").children(blocks)),
    )
}

fn education_section(items: &[Education]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let entries = items.iter().map(|edu| {
        div("text-sm")
            .child(text_el(Tag::H3, "font-semibold", edu.degree.as_str()))
            .child(text_el(Tag::P, "text-purple-200", edu.field.as_str()))
            .child(text_el(Tag::P, "text-purple-200", edu.institution.as_str()))
            .child(text_el(
                Tag::P,
                "text-purple-300 text-xs",
                date_range(&edu.start_date, &edu.end_date),
            ))
            .child_opt(
                present(&edu.gpa)
                    .map(|gpa| text_el(Tag::P, "text-purple-300 text-xs", format!("GPA: {gpa}"))),
            )
    });
    Some(
        div("")
            .child(sidebar_heading("Education"))
            .child(div("flex flex-col gap-4").children(entries)),
    )
}

/// Heading with the short gradient accent bar underneath.
fn main_heading(title: &str) -> ElementNode {
    div("")
        .child(text_el(Tag::H2, MAIN_HEADING, title))
        .child(div("w-12 h-1 bg-gradient-to-r from-purple-600 to-purple-400 mb-4"))
}

fn about_section(info: &PersonalInfo) -> Option<ElementNode> {
    if info.summary.is_empty() {
        return None;
    }
    Some(
        section("")
            .child(main_heading("About Me"))
            .child(text_el(Tag::P, "text-gray-700 leading-relaxed", info.summary.as_str())),
    )
}

fn experience_section(items: &[Experience]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let last = items.len() - 1;
    let entries = items.iter().enumerate().map(|(i, exp)| {
        let connector = (i < last).then(|| div("w-0.5 flex-1 bg-purple-200 mt-1"));
        let description = (!exp.description.is_empty())
            .then(|| text_el(Tag::P, "text-gray-700 text-sm", exp.description.as_str()));
        let card = div("flex-1 bg-gray-50 rounded-lg p-4 mb-4")
            .child(
                div("flex justify-between items-start mb-2")
                    .child(
                        div("")
                            .child(text_el(
                                Tag::H3,
                                "text-lg font-bold text-gray-800",
                                exp.position.as_str(),
                            ))
                            .child(text_el(Tag::P, "text-purple-600 font-medium", exp.company.as_str())),
                    )
                    .child(span(
                        "text-sm text-gray-500",
                        date_range(&exp.start_date, end_date_label(exp)),
                    )),
            )
            .child_opt(description);

        div("flex gap-4")
            .child(
                div("flex flex-col items-center")
                    .child(icon("dot", "w-3 h-3 text-purple-600 mt-2"))
                    .child_opt(connector),
            )
            .child(card)
    });

    Some(
        section("")
            .child(main_heading("Experience"))
            .child(div("flex flex-col").children(entries)),
    )
}

fn projects_section(items: &[Project]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let cards = items.iter().map(|project| {
        let description = (!project.description.is_empty())
            .then(|| text_el(Tag::P, "text-gray-700 mb-3", project.description.as_str()));
        div("bg-gradient-to-r from-purple-50 to-pink-50 rounded-lg p-6 border-l-4 border-purple-600")
            .child(
                div("flex items-center justify-between mb-2")
                    .child(text_el(Tag::H3, "text-lg font-bold text-gray-800", project.name.as_str()))
                    .child_opt(project_links(
                        present(&project.link),
                        present(&project.github),
                        "text-purple-600",
                    )),
            )
            .child_opt(description)
            .child_opt(tech_badges(
                &project.technologies,
                "px-3 py-1 bg-purple-100 text-purple-800 text-xs rounded-full",
            ))
    });

    Some(
        section("")
            .child(main_heading("Projects"))
            .child(div("flex flex-col gap-4").children(cards)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample_resume;

    #[test]
    fn avatar_uses_uppercased_initial() {
        assert_eq!(initial("jane doe"), "J");
        assert_eq!(initial("  élodie"), "É");
        assert_eq!(initial(""), "");
    }

    #[test]
    fn timeline_connects_all_but_the_last_entry() {
        let data = sample_resume();
        let root = render(&data);
        let dots = root.find_all(&|e| e.attributes.get("data-icon").map(String::as_str) == Some("dot"));
        let connectors = root.find_all(&|e| e.has_class("w-0.5"));
        assert_eq!(dots.len(), data.experience.len());
        assert_eq!(connectors.len(), data.experience.len() - 1);
    }

    #[test]
    fn unnamed_resume_still_renders_sidebar() {
        let root = render(&ResumeData::default());
        assert!(root.find_all(&|e| e.tag == Tag::H1).len() == 1);
        assert!(!root.text_content().contains("About Me"));
        assert!(!root.text_content().contains("Contact"));
    }
}
