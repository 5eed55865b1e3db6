//! Recognized math command names.
//!
//! A command whose name appears here is accepted by the command scanner
//! without any lookahead guard. The set is read-only configuration; per-call
//! additions go through `NormalizeOptions::extra_commands` instead of
//! mutating this table.

use phf::{phf_set, Set};

/// Command names (without the leading backslash) that always denote math.
pub static MATH_COMMANDS: Set<&'static str> = phf_set! {
    // Fractions, roots, binomials
    "frac", "dfrac", "tfrac", "cfrac", "sqrt", "binom", "dbinom", "tbinom",
    // Trigonometry and friends
    "sin", "cos", "tan", "cot", "sec", "csc",
    "arcsin", "arccos", "arctan",
    "sinh", "cosh", "tanh", "coth",
    // Logs, limits, big operators
    "log", "ln", "lg", "exp", "lim", "limsup", "liminf",
    "sum", "prod", "coprod", "int", "iint", "iiint", "oint",
    "min", "max", "sup", "inf", "det", "gcd", "deg", "dim", "ker", "arg",
    "Pr", "mod", "pmod", "bmod", "operatorname",
    // Greek lowercase
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta",
    "eta", "theta", "vartheta", "iota", "kappa", "lambda", "mu", "nu",
    "xi", "pi", "varpi", "rho", "varrho", "sigma", "varsigma", "tau",
    "upsilon", "phi", "varphi", "chi", "psi", "omega",
    // Greek uppercase
    "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon",
    "Phi", "Psi", "Omega",
    // Relations
    "le", "leq", "ge", "geq", "ne", "neq", "approx", "equiv", "sim",
    "simeq", "cong", "propto", "ll", "gg", "prec", "succ", "mid", "parallel",
    "perp",
    // Binary operators
    "pm", "mp", "times", "div", "cdot", "circ", "bullet", "star", "ast",
    "oplus", "ominus", "otimes", "oslash", "odot", "wedge", "vee",
    // Arrows
    "to", "gets", "mapsto", "implies", "iff",
    "rightarrow", "leftarrow", "leftrightarrow", "longrightarrow",
    "longleftarrow", "Rightarrow", "Leftarrow", "Leftrightarrow",
    "Longrightarrow", "Longleftarrow", "uparrow", "downarrow",
    // Sets and logic
    "in", "notin", "ni", "subset", "supset", "subseteq", "supseteq",
    "cup", "cap", "setminus", "emptyset", "varnothing", "forall", "exists",
    "nexists", "neg", "lnot", "land", "lor",
    // Named sets and misc symbols
    "mathbb", "mathbf", "mathit", "mathrm", "mathsf", "mathcal", "mathfrak",
    "mathscr", "boldsymbol", "infty", "partial", "nabla", "hbar", "ell",
    "Re", "Im", "aleph", "wp", "angle", "triangle", "degree", "prime",
    "cdots", "ldots", "dots", "dotsb", "ddots", "vdots",
    // Accents and decorations
    "vec", "hat", "widehat", "bar", "overline", "underline", "tilde",
    "widetilde", "dot", "ddot", "overbrace", "underbrace", "overrightarrow",
    // Delimiter sizing
    "left", "right", "big", "Big", "bigg", "Bigg", "langle", "rangle",
    "lvert", "rvert", "lVert", "rVert", "lfloor", "rfloor", "lceil", "rceil",
    // Text inside math
    "text", "textbf", "textit", "textrm",
    // Spacing
    "quad", "qquad", "thinspace", "medspace", "thickspace", "phantom",
    // Structure helpers the scanner may meet mid-expression
    "limits", "nolimits", "substack", "stackrel", "overset", "underset",
    "not",
};

/// Membership check against the static table only.
pub fn is_math_command(name: &str) -> bool {
    MATH_COMMANDS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_commands_present() {
        for name in ["frac", "sin", "int", "alpha", "Omega", "neq", "quad"] {
            assert!(is_math_command(name), "expected '{}' in the set", name);
        }
    }

    #[test]
    fn test_structure_commands_absent() {
        // \begin and \end must never be accepted as standalone math: the
        // environment pass owns them.
        assert!(!is_math_command("begin"));
        assert!(!is_math_command("end"));
        assert!(!is_math_command("documentclass"));
    }
}
