//! JSON bodies exchanged over the HTTP API

use serde::{Deserialize, Serialize};

/// Returned by the liveness route
pub const HEALTH_MESSAGE: &str = "Setu Backend API is running!";

/// Acknowledgement sent for every contact form submission
pub const CONTACT_ACK: &str = "Your message has been received. We'll get back to you soon!";

pub const SUCCESS: &str = "success";

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Transcription {
    pub status: &'static str,
    pub predicted_class: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Body of a 500 response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of a 422 response
#[derive(Debug, Serialize)]
pub struct ValidationErrors {
    pub detail: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    /// Where the problem is, e.g. `["body", "file"]`
    pub loc: Vec<&'static str>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ValidationErrors {
    pub fn single(loc: Vec<&'static str>, msg: impl Into<String>, kind: &'static str) -> Self {
        ValidationErrors {
            detail: vec![FieldError {
                loc,
                msg: msg.into(),
                kind,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamMember {
    pub name: &'static str,
    pub role: &'static str,
    pub description: &'static str,
    pub linkedin: &'static str,
    pub github: &'static str,
}

#[derive(Debug, Serialize)]
pub struct About {
    pub title: &'static str,
    pub mission_statement: &'static str,
    pub team: &'static [TeamMember],
}

pub static ABOUT: About = About {
    title: "About Setu",
    mission_statement: "At Setu, our mission is to bridge communication gaps through Nepali \
        Sign Language translation. We believe everyone deserves equal access to understanding \
        and expression, without the barriers of language or communication challenges.",
    team: &[
        TeamMember {
            name: "Rojin Baniya",
            role: "Machine Learning",
            description: "Designs and develops machine learning models, trains and evaluates \
                algorithms, and applies them to solve real-world problems.",
            linkedin: "https://linkedin.com/in/rojin-baniya",
            github: "https://github.com/rojin-baniya",
        },
        TeamMember {
            name: "Aaryan Sharma",
            role: "MLOps",
            description: "Builds and manages machine learning pipelines, model deployment, \
                monitoring, and infrastructure automation.",
            linkedin: "https://linkedin.com/in/aaryan-sharma",
            github: "https://github.com/aaryan-sharma",
        },
        TeamMember {
            name: "Prakriti Devkota",
            role: "Frontend Developer",
            description: "Creates dynamic, responsive, and user-friendly interfaces.",
            linkedin: "https://linkedin.com/in/prakriti-devkota",
            github: "https://github.com/prakriti-devkota",
        },
        TeamMember {
            name: "Rejina Budhathoki",
            role: "Backend Developer",
            description: "Builds and manages APIs, server-side logic, and database operations.",
            linkedin: "https://linkedin.com/in/rejina-budhathoki",
            github: "https://github.com/rejina-budhathoki",
        },
    ],
};
