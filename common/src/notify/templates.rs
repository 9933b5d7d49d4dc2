// Email rendering for notification events
//
// Templates are embedded at compile time so the library works from any
// working directory. Each event renders a text and an HTML body.

use crate::mailer::EmailMessage;
use crate::models::{ApplicationStatus, Job, User};
use tera::{Context, Tera};

lazy_static::lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        let loaded = tera.add_raw_templates(vec![
            (
                "job_created.txt",
                include_str!("../../templates/email/job_created.txt"),
            ),
            (
                "job_created.html",
                include_str!("../../templates/email/job_created.html"),
            ),
            (
                "application_received.txt",
                include_str!("../../templates/email/application_received.txt"),
            ),
            (
                "application_received.html",
                include_str!("../../templates/email/application_received.html"),
            ),
            (
                "status_changed.txt",
                include_str!("../../templates/email/status_changed.txt"),
            ),
            (
                "status_changed.html",
                include_str!("../../templates/email/status_changed.html"),
            ),
            (
                "job_deleted.txt",
                include_str!("../../templates/email/job_deleted.txt"),
            ),
            (
                "job_deleted.html",
                include_str!("../../templates/email/job_deleted.html"),
            ),
            (
                "profile_nudge.txt",
                include_str!("../../templates/email/profile_nudge.txt"),
            ),
            (
                "profile_nudge.html",
                include_str!("../../templates/email/profile_nudge.html"),
            ),
        ]);
        match loaded {
            Ok(()) => tera,
            Err(e) => {
                tracing::error!("Template parsing error: {}", e);
                std::process::exit(1);
            }
        }
    };
}

fn render_pair(name: &str, context: &Context) -> Result<(String, String), tera::Error> {
    let text = TEMPLATES.render(&format!("{}.txt", name), context)?;
    let html = TEMPLATES.render(&format!("{}.html", name), context)?;
    Ok((text, html))
}

pub fn job_created_email(
    user: &User,
    job: &Job,
    company_name: &str,
) -> Result<EmailMessage, tera::Error> {
    let mut context = Context::new();
    context.insert("full_name", &user.full_name);
    context.insert("job_title", &job.title);
    context.insert("company_name", company_name);
    context.insert("location", &job.location);
    context.insert("salary", &job.salary);

    let (text_body, html_body) = render_pair("job_created", &context)?;
    Ok(EmailMessage {
        to: user.email.clone(),
        subject: format!("New job for you: {} at {}", job.title, company_name),
        text_body,
        html_body,
    })
}

pub fn application_received_email(
    applicant: &User,
    job: &Job,
    company_name: &str,
) -> Result<EmailMessage, tera::Error> {
    let mut context = Context::new();
    context.insert("full_name", &applicant.full_name);
    context.insert("job_title", &job.title);
    context.insert("company_name", company_name);

    let (text_body, html_body) = render_pair("application_received", &context)?;
    Ok(EmailMessage {
        to: applicant.email.clone(),
        subject: format!("We received your application for {}", job.title),
        text_body,
        html_body,
    })
}

pub fn status_changed_email(
    applicant: &User,
    job_title: &str,
    status: ApplicationStatus,
    company_name: &str,
) -> Result<EmailMessage, tera::Error> {
    let mut context = Context::new();
    context.insert("full_name", &applicant.full_name);
    context.insert("job_title", job_title);
    context.insert("company_name", company_name);
    context.insert("status", &status.to_string());
    context.insert("rejected", &(status == ApplicationStatus::Rejected));

    let (text_body, html_body) = render_pair("status_changed", &context)?;
    Ok(EmailMessage {
        to: applicant.email.clone(),
        subject: format!("Update on your application for {}", job_title),
        text_body,
        html_body,
    })
}

pub fn job_deleted_email(
    applicant: &User,
    job_title: &str,
    company_name: &str,
) -> Result<EmailMessage, tera::Error> {
    let mut context = Context::new();
    context.insert("full_name", &applicant.full_name);
    context.insert("job_title", job_title);
    context.insert("company_name", company_name);

    let (text_body, html_body) = render_pair("job_deleted", &context)?;
    Ok(EmailMessage {
        to: applicant.email.clone(),
        subject: format!("Job posting removed: {}", job_title),
        text_body,
        html_body,
    })
}

pub fn profile_nudge_email(user: &User) -> Result<EmailMessage, tera::Error> {
    let mut context = Context::new();
    context.insert("full_name", &user.full_name);

    let (text_body, html_body) = render_pair("profile_nudge", &context)?;
    Ok(EmailMessage {
        to: user.email.clone(),
        subject: "Add skills to start getting job recommendations".to_string(),
        text_body,
        html_body,
    })
}
