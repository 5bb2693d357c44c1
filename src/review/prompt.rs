use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("No prompt defined for repository: '{0}'")]
    UnknownRepository(String),
}

const PREAMBLE: &str = "You are an expert at analyzing pull requests for software projects. \
Your task is to review the diff provided below and give a detailed analysis, \
identifying potential problems and suggesting improvements.";

const OUTPUT_FORMAT: &str = "\
Response format:

**Analysis:**

**Issues and Suggestions:**
- [List of identified problems and specific suggestions]

**Additional Comments:**
- [Other relevant comments]";

const LARAVEL_API_RULES: &str = "\
Apply the following criteria when reviewing PHP code written with Laravel:

* Quality and clarity
- Is the code clean, readable and concise?
- Avoid redundancy and unnecessary complexity.
- Do not use `else` blocks (prefer early returns).
- No commented-out code may be committed.

* Practices and conventions
- Follow the project's conventions (naming, structure, organization).
- The pull request name must follow `feature/TRM-<number>-<description>` or `hotfix/TRM-<number>-<description>`.
- Service methods should have a single responsibility, preferably through `__invoke()`.

* Security and stability
- Forbid `dd()`, `dump()`, `var_dump()` and similar helpers.
- Forbid calling `env()` directly; go through `config()` instead.
- Every route must be behind a permission/authorization middleware.
- Forbid `try-catch`; rely on centralized error handling where applicable.

* Architecture and organization
- Controllers must always return a `Response`.
- Queries must be encapsulated in model `scope`s.
- Migration names must end in `_table`.
- `id` and `timestamps` must never appear in a model's `fillable` array.

* Modern PHP and current Laravel
- Only constructor property promotion is allowed for constructor-assigned properties.";

const REACT_APP_RULES: &str = "\
Apply the following criteria when reviewing React (JavaScript) code:

* Quality and clarity
- Is the code readable, with descriptive names and a logical layout?
- Avoid `else` branches (prefer early returns).
- Avoid redundant or duplicated code.
- No commented-out code may be committed.

* Style and practices
- Forbid `console.log`, `debugger` and similar output in production code.
- Forbid inline styles (`style={{ ... }}`); use classes or styled-components.
- Use hooks consistently and keep complex logic out of components.

* State and mutability
- Flag any direct modification of a value from `initialState` (state must stay immutable).
- Prefer `useReducer` when state is complex.
- Never assign state directly (`state = ...`); always use `setState` or the matching hook setter.

* Architecture and project layout
- Follow the project's folder structure and conventions.
- Components should be small and have a single responsibility.
- Move business logic into custom hooks or external services when needed.

* Security and performance
- Look for memory leaks (listeners never removed, effects without dependencies, etc.).
- Avoid needless re-renders (wrong `useEffect` dependencies, inline functions in JSX, etc.).
- Avoid manipulating the DOM directly (prefer refs).

* Pull requests and conventions
- The pull request name must follow `feature/TRM-<number>-<description>` or `hotfix/TRM-<number>-<description>`.
- Check that the pull request description clearly explains the motivation and the changes.";

/// A built-in block of review guidelines for one tech stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSet {
    LaravelApi,
    ReactApp,
}

impl RuleSet {
    /// Look up the rule set registered for a repository name.
    pub fn for_repository(repo_name: &str) -> Option<RuleSet> {
        match repo_name {
            "example-repository-api" | "exemplo_nome_repositorio_api" => Some(RuleSet::LaravelApi),
            "example-repository-app" | "exemplo_nome_repositorio_app" => Some(RuleSet::ReactApp),
            _ => None,
        }
    }

    pub fn guidelines(self) -> &'static str {
        match self {
            RuleSet::LaravelApi => LARAVEL_API_RULES,
            RuleSet::ReactApp => REACT_APP_RULES,
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSet::LaravelApi => write!(f, "laravel-api"),
            RuleSet::ReactApp => write!(f, "react-app"),
        }
    }
}

/// Resolves repository names to rule sets and composes review prompts.
///
/// Aliases from the config file are consulted before the built-in table.
/// `RuleBook::default()` knows only the built-in repositories.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    aliases: BTreeMap<String, RuleSet>,
}

impl RuleBook {
    pub fn new(aliases: BTreeMap<String, RuleSet>) -> Self {
        Self { aliases }
    }

    pub fn rule_set(&self, repo_name: &str) -> Result<RuleSet, PromptError> {
        self.aliases
            .get(repo_name)
            .copied()
            .or_else(|| RuleSet::for_repository(repo_name))
            .ok_or_else(|| PromptError::UnknownRepository(repo_name.to_string()))
    }

    /// Build the review prompt for a pull request of `repo_name`.
    ///
    /// The diff is embedded verbatim, empty or not.
    pub fn compose(
        &self,
        repo_name: &str,
        diff_text: &str,
        pr_title: &str,
        pr_number: u64,
    ) -> Result<String, PromptError> {
        let rules = self.rule_set(repo_name)?;
        Ok(compose_with(rules, diff_text, pr_title, pr_number))
    }
}

pub fn compose_with(rules: RuleSet, diff_text: &str, pr_title: &str, pr_number: u64) -> String {
    format!(
        "{PREAMBLE}\n\n{}\n\n{OUTPUT_FORMAT}\n\n**Pull Request Diff:**\n{diff_text}\n\nPR title: {pr_title} number {pr_number}",
        rules.guidelines()
    )
}
