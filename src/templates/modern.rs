//! Modern: gradient banner with contact line, then a two-column body with
//! experience and projects on the left and education and skills in a
//! sidebar.

use crate::dom::{div, icon, section, span, text_el, ElementNode, Tag};
use crate::model::{Education, Experience, Project, ResumeData, Skill};

use super::{
    contact_items, date_range, end_date_label, group_skills, present, project_links, star_rating,
    tech_badges,
};

const HEADING: &str = "font-bold text-gray-800 mb-4 pb-2 border-b-2 border-blue-600";

pub(super) fn render(data: &ResumeData) -> ElementNode {
    let main = div("flex-2 flex flex-col gap-8")
        .child_opt(experience_section(&data.experience))
        .child_opt(projects_section(&data.projects));
    let sidebar = div("flex-1 flex flex-col gap-8")
        .child_opt(education_section(&data.education))
        .child_opt(skills_section(&data.skills));

    div("bg-white text-gray-800 font-sans leading-relaxed")
        .child(header(data))
        .child(div("p-8").child(div("flex gap-8").child(main).child(sidebar)))
}

fn header(data: &ResumeData) -> ElementNode {
    let info = &data.personal_info;
    let summary = (!info.summary.is_empty())
        .then(|| text_el(Tag::P, "text-blue-100 text-lg", info.summary.as_str()));
    let contacts = contact_items(info).into_iter().map(|(kind, label)| {
        div("flex items-center")
            .child(icon(kind, "w-4 h-4 mr-2"))
            .child(span("", label))
    });

    div("bg-gradient-to-r from-blue-600 to-blue-800 text-white p-8")
        .child(
            div("mb-4")
                .child(text_el(Tag::H1, "text-4xl font-bold mb-2", info.full_name.as_str()))
                .child_opt(summary),
        )
        .child(div("mt-6 flex flex-wrap gap-4 text-sm").children(contacts))
}

fn experience_section(items: &[Experience]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let entries = items.iter().map(|exp| {
        let description = (!exp.description.is_empty())
            .then(|| text_el(Tag::P, "text-gray-600 mt-2", exp.description.as_str()));
        div("")
            .child(
                div("flex justify-between items-start mb-2")
                    .child(
                        div("")
                            .child(text_el(
                                Tag::H3,
                                "text-xl font-semibold text-gray-800",
                                exp.position.as_str(),
                            ))
                            .child(text_el(Tag::P, "text-blue-600 font-medium", exp.company.as_str())),
                    )
                    .child(
                        div("flex items-center text-sm text-gray-600")
                            .child(icon("calendar", "w-4 h-4 mr-1"))
                            .child(span("", date_range(&exp.start_date, end_date_label(exp)))),
                    ),
            )
            .child_opt(description)
    });

    Some(
        section("")
            .child(text_el(Tag::H2, &format!("text-2xl {HEADING}"), "Professional Experience"))
            .child(div("flex flex-col gap-6").children(entries)),
    )
}

fn projects_section(items: &[Project]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let entries = items.iter().map(|project| {
        let description = (!project.description.is_empty())
            .then(|| text_el(Tag::P, "text-gray-600 mb-2", project.description.as_str()));
        div("")
            .child(
                div("flex items-center justify-between mb-2")
                    .child(text_el(
                        Tag::H3,
                        "text-xl font-semibold text-gray-800",
                        project.name.as_str(),
                    ))
                    .child_opt(project_links(
                        present(&project.link),
                        present(&project.github),
                        "text-blue-600",
                    )),
            )
            .child_opt(description)
            .child_opt(tech_badges(
                &project.technologies,
                "px-2 py-1 bg-blue-100 text-blue-800 text-xs rounded-md",
            ))
    });

    Some(
        section("")
            .child(text_el(Tag::H2, &format!("text-2xl {HEADING}"), "Projects"))
            .child(div("flex flex-col gap-6").children(entries)),
    )
}

fn education_section(items: &[Education]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let entries = items.iter().map(|edu| {
        div("")
            .child(text_el(Tag::H3, "text-sm font-semibold text-gray-800", edu.degree.as_str()))
            .child(text_el(Tag::P, "text-blue-600 font-medium", edu.field.as_str()))
            .child(text_el(Tag::P, "text-gray-600 text-sm", edu.institution.as_str()))
            .child(
                div("flex items-center justify-between text-xs text-gray-500 mt-1")
                    .child(span("", date_range(&edu.start_date, &edu.end_date)))
                    .child_opt(present(&edu.gpa).map(|gpa| span("", format!("GPA: {gpa}")))),
            )
    });

    Some(
        section("")
            .child(text_el(Tag::H2, &format!("text-xl {HEADING}"), "Education"))
            .child(div("flex flex-col gap-4").children(entries)),
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
                .child(span("text-gray-600 text-sm", skill.name.as_str()))
                .child(star_rating(&skill.level, "text-blue-500", "text-gray-300"))
        });
        div("")
            .child(text_el(
                Tag::H3,
                "text-sm font-semibold text-gray-700 mb-2 capitalize",
                category,
            ))
            .child(div("flex flex-col gap-2").children(rows))
    });

    Some(
        section("")
            .child(text_el(Tag::H2, &format!("text-xl {HEADING}"), "Skills"))
            .child(div("flex flex-col gap-4").children(blocks)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample_resume;

    #[test]
    fn sidebar_holds_education_and_skills() {
        let root = render(&sample_resume());
        let columns = root.find_all(&|e| e.has_class("flex-1") || e.has_class("flex-2"));
        assert_eq!(columns.len(), 2);
        let main = columns[0].text_content();
        let side = columns[1].text_content();
        assert!(main.contains("Professional Experience") && main.contains("Projects"));
        assert!(side.contains("Education") && side.contains("Skills"));
    }

    #[test]
    fn banner_shows_name_and_linkedin_label() {
        let data = sample_resume();
        let root = render(&data);
        let h1 = root.find_all(&|e| e.tag == Tag::H1);
        assert_eq!(h1[0].text_content(), data.personal_info.full_name);
        assert!(root.text_content().contains("LinkedIn"));
        assert!(!root.text_content().contains(&data.personal_info.linkedin));
    }
}
