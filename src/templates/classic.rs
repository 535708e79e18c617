//! Classic: centered serif header over a single column.

use crate::dom::{div, icon, section, span, text_el, ElementNode, Tag};
use crate::model::{Education, Experience, Project, ResumeData, Skill};

use super::{contact_items, date_range, end_date_label, group_skills, present, project_links};

const HEADING: &str = "text-2xl font-bold text-gray-800 mb-4 uppercase border-b border-gray-300 pb-2";

pub(super) fn render(data: &ResumeData) -> ElementNode {
    div("bg-white text-gray-800 font-serif leading-relaxed")
        .child(header(data))
        .child(
            div("px-8 flex flex-col gap-8")
                .child_opt(experience_section(&data.experience))
                .child_opt(education_section(&data.education))
                .child_opt(skills_section(&data.skills))
                .child_opt(projects_section(&data.projects)),
        )
}

fn header(data: &ResumeData) -> ElementNode {
    let info = &data.personal_info;
    let contacts = contact_items(info).into_iter().map(|(kind, label)| {
        div("flex items-center")
            .child(icon(kind, "w-4 h-4 mr-1"))
            .child(span("", label))
    });
    let summary = (!info.summary.is_empty()).then(|| {
        div("mt-6")
            .child(text_el(
                Tag::H2,
                "text-lg font-semibold text-gray-800 mb-2",
                "Professional Summary",
            ))
            .child(text_el(Tag::P, "text-gray-700 leading-relaxed", info.summary.as_str()))
    });

    div("text-center border-b-2 border-gray-800 pb-6 mb-8 pt-8 px-8")
        .child(text_el(Tag::H1, "text-4xl font-bold text-gray-800 mb-4", info.full_name.as_str()))
        .child(div("flex flex-wrap justify-center gap-4 text-sm text-gray-600").children(contacts))
        .child_opt(summary)
}

fn experience_section(items: &[Experience]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let entries = items.iter().map(|exp| {
        let description = (!exp.description.is_empty())
            .then(|| text_el(Tag::P, "text-gray-700 leading-relaxed", exp.description.as_str()));
        div("")
            .child(
                div("flex justify-between items-start mb-2")
                    .child(
                        div("")
                            .child(text_el(Tag::H3, "text-lg font-bold text-gray-800", exp.position.as_str()))
                            .child(text_el(Tag::P, "text-gray-700 font-medium", exp.company.as_str())),
                    )
                    .child(text_el(
                        Tag::P,
                        "text-sm text-gray-600 text-right",
                        date_range(&exp.start_date, end_date_label(exp)),
                    )),
            )
            .child_opt(description)
    });

    Some(
        section("")
            .child(text_el(Tag::H2, HEADING, "Professional Experience"))
            .child(div("flex flex-col gap-6").children(entries)),
    )
}

fn education_section(items: &[Education]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let entries = items.iter().map(|edu| {
        let dates = div("text-sm text-gray-600 text-right")
            .child(text_el(Tag::P, "", date_range(&edu.start_date, &edu.end_date)))
            .child_opt(present(&edu.gpa).map(|gpa| text_el(Tag::P, "", format!("GPA: {gpa}"))));
        div("flex justify-between items-start")
            .child(
                div("")
                    .child(text_el(
                        Tag::H3,
                        "text-lg font-bold text-gray-800",
                        format!("{} in {}", edu.degree, edu.field),
                    ))
                    .child(text_el(Tag::P, "text-gray-700", edu.institution.as_str())),
            )
            .child(dates)
    });

    Some(
        section("")
            .child(text_el(Tag::H2, HEADING, "Education"))
            .child(div("flex flex-col gap-4").children(entries)),
    )
}

fn skills_section(skills: &[Skill]) -> Option<ElementNode> {
    let groups = group_skills(skills);
    if groups.is_empty() {
        return None;
    }
    let cells = groups.into_iter().map(|(category, members)| {
        let last = members.len() - 1;
        let names = members.into_iter().enumerate().map(|(i, skill)| {
            let mut label = format!("{} ({})", skill.name, skill.level);
            if i < last {
                label.push_str(", ");
            }
            span("", label)
        });
        div("w-1/2 pr-6 mb-4")
            .child(text_el(
                Tag::H3,
                "font-bold text-gray-800 mb-2 capitalize",
                category,
            ))
            .child(div("flex flex-wrap text-gray-700").children(names))
    });

    Some(
        section("")
            .child(text_el(Tag::H2, HEADING, "Skills"))
            .child(div("flex flex-wrap").children(cells)),
    )
}

fn projects_section(items: &[Project]) -> Option<ElementNode> {
    if items.is_empty() {
        return None;
    }
    let entries = items.iter().map(|project| {
        let description = (!project.description.is_empty())
            .then(|| text_el(Tag::P, "text-gray-700 mb-2", project.description.as_str()));
        let technologies = (!project.technologies.is_empty()).then(|| {
            ElementNode::new(Tag::P)
                .class("text-sm text-gray-600")
                .child(text_el(Tag::Strong, "", "Technologies:"))
                .text(format!(" {}", project.technologies.join(", ")))
        });
        div("")
            .child(
                div("flex items-center justify-between mb-2")
                    .child(text_el(Tag::H3, "text-lg font-bold text-gray-800", project.name.as_str()))
                    .child_opt(project_links(
                        present(&project.link),
                        present(&project.github),
                        "text-gray-600",
                    )),
            )
            .child_opt(description)
            .child_opt(technologies)
    });

    Some(
        section("")
            .child(text_el(Tag::H2, HEADING, "Projects"))
            .child(div("flex flex-col gap-4").children(entries)),
    )
}
