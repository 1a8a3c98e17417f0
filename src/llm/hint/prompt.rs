

pub fn build_hint_prompt(query: &str) -> String {
    let query = query.replace('"', "'");
    format!(
        r#"Extract structured filters from this query: "{query}".
Return JSON with fields: category, follower_filter (>,<,= value), sort_by.
Example:
Input: "Show top fashion creators with >10000 followers"
Output: {{"category":"fashion","follower_filter":">10000","sort_by":"engagement rate"}}
"#
    )
}
