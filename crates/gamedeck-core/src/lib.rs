pub mod catalog;
pub mod category;
pub mod embed;
pub mod game;
pub mod library;
pub mod persistence;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::catalog::Catalog;
    use crate::embed::{EmbedError, EmbedPlatform, FrameAttributes, FullscreenTarget, ScriptElement};
    use crate::game::Game;

    /// Create a game with the given id, title, categories and play count.
    pub fn make_game(id: u64, title: &str, categories: &[&str], plays: u64) -> Game {
        let mut game = Game::new(id, title);
        game.category = categories.iter().map(|c| c.to_string()).collect();
        game.plays = plays;
        game
    }

    /// Create a catalog of `n` games with ids 1..=n and distinct play counts.
    pub fn make_catalog(n: u64) -> Catalog {
        Catalog::new(
            (1..=n)
                .map(|i| make_game(i, &format!("Game {i}"), &["action"], i * 100))
                .collect(),
        )
    }

    /// A script slot inside [`FakePlatform`]'s container.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeScript {
        pub element: ScriptElement,
        /// False while the element is the inert copy produced by injection.
        pub live: bool,
    }

    /// In-memory stand-in for the browser document.
    #[derive(Debug, Default)]
    pub struct FakePlatform {
        pub fullscreen: Option<FullscreenTarget>,
        pub deny_fullscreen: bool,
        pub frame: Option<FrameAttributes>,
        pub markup: Option<String>,
        pub scripts: Vec<FakeScript>,
        pub clears: usize,
        /// Indices passed to `replace_script`, in call order.
        pub replaced: Vec<usize>,
        /// Make `replace_script` fail for this index.
        pub fail_replace_at: Option<usize>,
    }

    impl EmbedPlatform for FakePlatform {
        fn fullscreen_active(&self) -> bool {
            self.fullscreen.is_some()
        }

        fn request_fullscreen(&mut self, target: FullscreenTarget) -> Result<(), EmbedError> {
            if self.deny_fullscreen {
                return Err(EmbedError::Fullscreen("permission denied".to_string()));
            }
            self.fullscreen = Some(target);
            Ok(())
        }

        fn exit_fullscreen(&mut self) -> Result<(), EmbedError> {
            self.fullscreen = None;
            Ok(())
        }

        fn mount_markup(&mut self, markup: &str) -> Result<Vec<ScriptElement>, EmbedError> {
            self.frame = None;
            self.markup = Some(markup.to_string());
            let found = parse_scripts(markup);
            self.scripts = found
                .iter()
                .cloned()
                .map(|element| FakeScript {
                    element,
                    live: false,
                })
                .collect();
            Ok(found)
        }

        fn replace_script(
            &mut self,
            index: usize,
            script: &ScriptElement,
        ) -> Result<(), EmbedError> {
            self.replaced.push(index);
            if self.fail_replace_at == Some(index) {
                return Err(EmbedError::Mount(format!("script {index} rejected")));
            }
            let slot = self
                .scripts
                .get_mut(index)
                .ok_or_else(|| EmbedError::Mount(format!("no script at index {index}")))?;
            *slot = FakeScript {
                element: script.clone(),
                live: true,
            };
            Ok(())
        }

        fn mount_frame(&mut self, frame: &FrameAttributes) -> Result<(), EmbedError> {
            self.markup = None;
            self.scripts.clear();
            self.frame = Some(frame.clone());
            Ok(())
        }

        fn clear(&mut self) {
            self.frame = None;
            self.markup = None;
            self.scripts.clear();
            self.clears += 1;
        }
    }

    /// Minimal `<script>` scanner, enough for test markup.
    fn parse_scripts(markup: &str) -> Vec<ScriptElement> {
        const OPEN: &str = "<script";
        const CLOSE: &str = "</script>";

        let mut scripts = Vec::new();
        let mut rest = markup;
        while let Some(start) = rest.find(OPEN) {
            let after = &rest[start + OPEN.len()..];
            let Some(tag_end) = after.find('>') else {
                break;
            };
            let attributes = parse_attributes(&after[..tag_end]);
            let tail = &after[tag_end + 1..];
            let (body, next) = match tail.find(CLOSE) {
                Some(end) => (&tail[..end], &tail[end + CLOSE.len()..]),
                None => (tail, ""),
            };
            scripts.push(ScriptElement {
                attributes,
                body: body.to_string(),
            });
            rest = next;
        }
        scripts
    }

    fn parse_attributes(raw: &str) -> Vec<(String, String)> {
        let mut attributes = Vec::new();
        let mut chars = raw.trim().trim_end_matches('/').chars().peekable();
        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            let mut name = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=') {
                name.push(c);
            }
            if name.is_empty() {
                break;
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            let mut value = String::new();
            if chars.next_if_eq(&'=').is_some() {
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
                match chars.peek().copied() {
                    Some(quote @ ('"' | '\'')) => {
                        chars.next();
                        for c in chars.by_ref() {
                            if c == quote {
                                break;
                            }
                            value.push(c);
                        }
                    },
                    _ => {
                        while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                            value.push(c);
                        }
                    },
                }
            }
            attributes.push((name, value));
        }
        attributes
    }
}
