// Newsletter email content

use crate::domain::{Job, Subscriber};

/// Subject and plain-text body for one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

pub fn render(job: &Job, subscriber: &Subscriber) -> RenderedEmail {
    let subject = format!(
        "Hot Job Alert: {} in {} Available Now",
        job.title, job.niche
    );

    let body = format!(
        "Hi {name},\n\n\
         Great news! A new job that fits your niche has just been posted. \
         The position is for a {title} with {company}, and they are looking to hire immediately.\n\n\
         Job Details:\n\
         - Position: {title}\n\
         - Company: {company}\n\
         - Location: {location}\n\
         - Salary: {salary}\n\n\
         Don't wait too long! Job openings like these are filled quickly.\n\n\
         We're here to support you in your job search. Best of luck!\n\n\
         Best Regards,\n\
         NicheNest Team",
        name = subscriber.name,
        title = job.title,
        company = job.company_name,
        location = job.location,
        salary = job.salary,
    );

    RenderedEmail { subject, body }
}
