//! Prompt text for recommendation requests.

/// Wrap the trip summary in the instructions sent to the model.
///
/// The model is asked for a bare JSON object so the result can be stored and
/// rendered without scraping prose.
pub fn recommendation_prompt(summary: &str) -> String {
    format!(
        "\
You are an experienced hiking guide helping someone plan a trip.

Here is what they told us about the trip:
\"\"\"
{summary}
\"\"\"

Recommend up to 5 hiking trails that fit these preferences. Respect the \
search radius and the group (kids, toddlers, pets) when choosing trails.

Respond with ONLY a JSON object, no Markdown, in this shape:
{{
  \"trails\": [
    {{
      \"name\": \"string\",
      \"location\": \"string\",
      \"distance_miles\": number,
      \"elevation_gain_feet\": number,
      \"difficulty\": \"easy\" | \"moderate\" | \"difficult\" | \"expert\",
      \"estimated_hours\": number,
      \"highlights\": [\"string\"],
      \"why_it_fits\": \"string\"
    }}
  ],
  \"tips\": [\"string\"]
}}"
    )
}

/// Strip a surrounding Markdown code fence, if the model added one anyway.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse the model text as JSON, falling back to a JSON string.
pub fn parse_recommendations(text: &str) -> serde_json::Value {
    let body = strip_code_fence(text);
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_string()))
}
