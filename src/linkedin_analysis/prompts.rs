// src/linkedin_analysis/prompts.rs
use super::types::{MessageType, Post, ProfileData};

const NO_POSTS: &str = "No recent posts available";

fn field<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

/// Render scraped posts as numbered lines separated by blank lines.
pub fn format_posts(posts: &[Post]) -> String {
    if posts.is_empty() {
        return NO_POSTS.to_string();
    }

    posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            format!(
                "Post {} ({}): \"{}\" - {} reactions, {} comments",
                i + 1,
                if post.time.is_empty() { "Unknown" } else { post.time.as_str() },
                post.text,
                if post.reactions.is_empty() { "0" } else { post.reactions.as_str() },
                if post.comments.is_empty() { "0" } else { post.comments.as_str() },
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Recent activity block: the scraped activity text wins over formatted posts.
fn recent_activity(profile: &ProfileData) -> String {
    match profile.activity.as_deref().map(str::trim) {
        Some(activity) if !activity.is_empty() => activity.to_string(),
        _ => format_posts(&profile.posts),
    }
}

pub fn profile_summary(profile: &ProfileData) -> String {
    format!(
        r#"Name: {}
Location: {}
Headline (Full): {}
Current Company: {}
Connections: {}
Followers: {}

About Section:
{}

Highlights:
{}

Experience:
{}

Education:
{}

Licenses and Certifications:
{}

Top Skills: {}

Services:
{}

RECENT ACTIVITY & POSTS:
{}"#,
        field(&profile.name, "Not available"),
        field(&profile.location, "Not available"),
        field(&profile.headline, "Not available"),
        field(&profile.current_company, "Not available"),
        field(&profile.connections_count, "Unknown"),
        field(&profile.followers_count, "Unknown"),
        field(&profile.about, "No about section available"),
        field(&profile.highlights, "No highlights available"),
        field(&profile.experience, "No experience data available"),
        field(&profile.education, "No education data"),
        field(
            &profile.licenses_and_certifications,
            "No licenses or certifications listed"
        ),
        field(&profile.skills, "No skills listed"),
        field(&profile.services, "No services listed"),
        recent_activity(profile),
    )
}

pub fn build_analysis_prompt(profile: &ProfileData) -> String {
    format!(
        r#"You are a sales psychologist and DISC personality analyst. Study this LinkedIn profile and produce actionable sales insights.

PROFILE DATA:
{}

Cover, specifically for this person:
1. A DISC breakdown whose four scores total 100
2. Values, motivations and pain points
3. Topics they care about, judging by posts and career
4. How to approach them in a sales conversation
5. Messaging likely to resonate, and likely objections
6. A personalized email (subject and body) matching their DISC type
7. A LinkedIn connection message under 300 characters
8. A follow-up message for 3-5 days after first contact

Return ONLY this JSON object, without markdown:
{{
  "dominance": 35,
  "influence": 30,
  "steadiness": 20,
  "compliance": 15,
  "primaryType": "Influence (I)",
  "confidence": 78,
  "description": "Three short traits separated by bullets",
  "keyInsights": ["insight", "insight"],
  "communicationStyle": "How this person communicates",
  "salesApproach": "How to sell to this person",
  "painPoints": ["pain point", "pain point"],
  "idealPitch": "What the ideal pitch looks like",
  "communicationDos": ["do", "do"],
  "communicationDonts": ["don't", "don't"],
  "bestApproach": "Concrete opening strategy",
  "emailTemplate": {{
    "subject": "Personalized subject line",
    "body": "Personalized email body"
  }},
  "linkedinMessage": "Personalized LinkedIn message",
  "followUpMessage": "Personalized follow-up message"
}}

Base every field on this person's actual content, not on generic templates."#,
        profile_summary(profile)
    )
}

pub fn build_message_prompt(message_type: MessageType, query: &str, profile: &ProfileData) -> String {
    let summary = profile_summary(profile);

    match message_type {
        MessageType::Email => format!(
            r#"You are an email copywriter. Write a professional, personalized email to the person below.

PROFILE INFORMATION:
{summary}

USER REQUEST: {query}

The email must:
1. Reference specific details from this person's profile
2. Address the user's request: "{query}"
3. Be warm, professional and concise (two or three paragraphs)
4. Suit the person's likely DISC personality type

Return ONLY this JSON object, without markdown:
{{
  "subject": "Email subject line",
  "body": "Complete email body"
}}"#
        ),
        MessageType::Linkedin => format!(
            r#"You are a LinkedIn outreach writer. Write a personalized connection message or InMail to the person below.

PROFILE INFORMATION:
{summary}

USER REQUEST: {query}

The message must:
1. Reference specific details from this person's profile
2. Address the user's request: "{query}"
3. Stay under 300 characters for a connection request
4. Carry a clear reason for connecting

Return ONLY this JSON object, without markdown:
{{
  "message": "Complete LinkedIn message"
}}"#
        ),
        MessageType::Followup => format!(
            r#"You are writing a follow-up message to the person below, to be sent 3-5 days after first contact.

PROFILE INFORMATION:
{summary}

USER REQUEST: {query}

The message must:
1. Reference specific details from this person's profile
2. Address the user's request: "{query}"
3. Acknowledge the earlier contact and add new value
4. End with a soft call to action, without being pushy

Return ONLY this JSON object, without markdown:
{{
  "message": "Complete follow-up message"
}}"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> ProfileData {
        ProfileData {
            name: Some("Jane Doe".to_string()),
            headline: Some("Cloud Architect".to_string()),
            posts: vec![
                Post {
                    text: "Shipped our new platform".to_string(),
                    time: "2d".to_string(),
                    reactions: "42".to_string(),
                    comments: "".to_string(),
                },
                Post {
                    text: "Hiring!".to_string(),
                    time: "".to_string(),
                    reactions: "3".to_string(),
                    comments: "1".to_string(),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_format_posts() {
        let formatted = format_posts(&sample_profile().posts);
        assert_eq!(
            formatted,
            "Post 1 (2d): \"Shipped our new platform\" - 42 reactions, 0 comments\n\n\
             Post 2 (Unknown): \"Hiring!\" - 3 reactions, 1 comments"
        );
        assert_eq!(format_posts(&[]), NO_POSTS);
    }

    #[test]
    fn test_summary_defaults_and_activity_override() {
        let mut profile = sample_profile();
        let summary = profile_summary(&profile);
        assert!(summary.contains("Name: Jane Doe"));
        assert!(summary.contains("Location: Not available"));
        assert!(summary.contains("Post 1 (2d)"));

        profile.activity = Some("Commented on 5 posts about AWS".to_string());
        let summary = profile_summary(&profile);
        assert!(summary.contains("Commented on 5 posts about AWS"));
        assert!(!summary.contains("Post 1 (2d)"));
    }

    #[test]
    fn test_analysis_prompt_requests_json_shape() {
        let prompt = build_analysis_prompt(&sample_profile());
        for key in ["\"dominance\"", "\"primaryType\"", "\"communicationDonts\"", "\"emailTemplate\""] {
            assert!(prompt.contains(key), "missing {}", key);
        }
    }

    #[test]
    fn test_message_prompts_per_type() {
        let profile = sample_profile();
        let email = build_message_prompt(MessageType::Email, "Invite to webinar", &profile);
        assert!(email.contains("\"subject\""));
        assert!(email.contains("USER REQUEST: Invite to webinar"));

        let linkedin = build_message_prompt(MessageType::Linkedin, "Connect", &profile);
        assert!(linkedin.contains("\"message\""));
        assert!(!linkedin.contains("\"subject\""));

        let followup = build_message_prompt(MessageType::Followup, "Check in", &profile);
        assert!(followup.contains("3-5 days"));
    }
}
