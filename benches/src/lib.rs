pub mod context;

/// A page listing users, exercising every kind of tag.
pub const PAGE: &str = r#"<html>
  <head><title>{% block title %}{{ title }}{% endblock %}</title></head>
  <body>
    <h1>{{ title }}</h1>
    <ul>
    {%- for _, user in ipairs(users) %}
      {%- if not user.is_disabled %}
      <li>{{ user.name }} ({{ user.age }})</li>
      {%- else %}
      {$ disabled = (disabled or 0) + 1 $}
      {%- endif %}
    {%- endfor %}
    </ul>
    {% block +title %} and friends{% endblock %}
  </body>
</html>
"#;

/// Returns `source` repeated `n` times.
pub fn repeat(source: &str, n: usize) -> String {
    source.repeat(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_renders() {
        let ctx = context::random(10);
        let result = fmpl::Engine::new()
            .compile(PAGE)
            .unwrap()
            .render(&ctx)
            .to_string()
            .unwrap();
        assert!(result.contains(&format!("<title>{} and friends</title>", ctx.title)));
        let enabled = ctx.users.iter().filter(|u| !u.is_disabled).count();
        assert_eq!(result.matches("<li>").count(), enabled);
    }
}
