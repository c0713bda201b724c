///
/// LikePattern
///
/// Precompiled `LIKE` pattern. Matching is per character, case-sensitive,
/// and has no escape character.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LikePattern {
    tokens: Vec<LikeToken>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LikeToken {
    AnyMany,
    AnyOne,
    Char(char),
}

impl LikePattern {
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        let mut tokens = Vec::with_capacity(pattern.len());
        for c in pattern.chars() {
            let token = match c {
                '%' => LikeToken::AnyMany,
                '_' => LikeToken::AnyOne,
                other => LikeToken::Char(other),
            };

            // consecutive `%` are equivalent to one
            if token == LikeToken::AnyMany && tokens.last() == Some(&LikeToken::AnyMany) {
                continue;
            }
            tokens.push(token);
        }

        Self { tokens }
    }

    /// Wildcard match with single-star backtracking; linear in the common case.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let (mut t, mut p) = (0usize, 0usize);
        let mut star: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(LikeToken::AnyOne) => {
                    t += 1;
                    p += 1;
                }
                Some(LikeToken::Char(c)) if *c == text[t] => {
                    t += 1;
                    p += 1;
                }
                Some(LikeToken::AnyMany) => {
                    star = Some((p, t));
                    p += 1;
                }
                _ => match star {
                    Some((star_p, star_t)) => {
                        p = star_p + 1;
                        t = star_t + 1;
                        star = Some((star_p, star_t + 1));
                    }
                    None => return false,
                },
            }
        }

        self.tokens[p..].iter().all(|t| *t == LikeToken::AnyMany)
    }
}
