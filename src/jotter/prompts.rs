pub fn extraction_prompt(text: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You extract vehicle-repair booking details from a front-desk note.\n");
    prompt.push_str("Return STRICT JSON only, matching the shape below exactly.\n");
    prompt.push_str("Rules:\n");
    prompt.push_str("- Every value is a string, or null when the note does not state it.\n");
    prompt.push_str("- Be conservative: prefer null over guessing.\n");
    prompt.push_str("- Keep phone numbers digit-for-digit as written.\n");
    prompt.push_str("- Normalise UK registrations to 'AA00 AAA' spacing.\n");
    prompt.push_str("- Keep the issue short and in the customer's words.\n");
    prompt.push_str("\nNOTE:\n");
    prompt.push_str(text);
    prompt.push_str("\n\nOutput format:\n");
    prompt.push_str(
        "{\"customer_name\":null,\"phone\":null,\"vehicle\":null,\"year\":null,\"registration\":null,\"issue\":null,\"notes\":null}\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::extraction_prompt;

    #[test]
    fn prompt_names_every_target_field_and_embeds_the_note() {
        let prompt = extraction_prompt("Ford Focus won't start");
        for key in [
            "customer_name",
            "phone",
            "vehicle",
            "year",
            "registration",
            "issue",
            "notes",
        ] {
            assert!(prompt.contains(key), "missing key {key}");
        }
        assert!(prompt.contains("Ford Focus won't start"));
        assert!(prompt.contains("null over guessing"));
    }
}
