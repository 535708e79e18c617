//! Sample resume used by `resume sample` and throughout the tests.

use crate::model::{
    Education, Experience, PersonalInfo, Project, ResumeData, Skill, SkillLevel, TemplateId,
};

fn skill(id: &str, name: &str, category: &str, level: SkillLevel) -> Skill {
    Skill {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        level,
    }
}

/// A fully populated resume touching every section and optional field.
pub fn sample_resume() -> ResumeData {
    ResumeData {
        personal_info: PersonalInfo {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "+1 555 0100".into(),
            location: "Portland, OR".into(),
            website: "janedoe.dev".into(),
            linkedin: "https://linkedin.com/in/janedoe".into(),
            summary: "Systems engineer focused on reliable storage and fast tooling.".into(),
        },
        experience: vec![
            Experience {
                id: "exp-1".into(),
                position: "Senior Engineer".into(),
                company: "Acme Storage".into(),
                start_date: "2021-03".into(),
                end_date: "2023-01".into(),
                current: true,
                description: "Led the rewrite of the replication layer.".into(),
            },
            Experience {
                id: "exp-2".into(),
                position: "Software Engineer".into(),
                company: "Initech".into(),
                start_date: "2017-06".into(),
                end_date: "2021-02".into(),
                current: false,
                description: "Built the billing export pipeline.".into(),
            },
        ],
        education: vec![Education {
            id: "edu-1".into(),
            institution: "State University".into(),
            degree: "BSc".into(),
            field: "Computer Science".into(),
            start_date: "2013-09".into(),
            end_date: "2017-05".into(),
            gpa: Some("3.8".into()),
        }],
        skills: vec![
            skill("sk-1", "Rust", "Languages", SkillLevel::Expert),
            skill("sk-2", "Docker", "Tools", SkillLevel::Advanced),
            skill("sk-3", "Go", "Languages", SkillLevel::Intermediate),
            skill("sk-4", "Terraform", "Tools", SkillLevel::Beginner),
        ],
        projects: vec![Project {
            id: "prj-1".into(),
            name: "pdf-forge".into(),
            description: "HTML to PDF renderer.".into(),
            technologies: vec!["Rust".into(), "taffy".into(), "printpdf".into()],
            link: Some("https://forge.example.com".into()),
            github: Some("https://github.com/janedoe/forge".into()),
        }],
        template: TemplateId::Modern,
    }
}
