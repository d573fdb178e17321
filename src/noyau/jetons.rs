// src/noyau/jetons.rs
//
// Modèle de jeton
// ---------------
// - TypeJeton : catégorie lexicale (somme fermée, match exhaustif)
// - Jeton     : valeur + plage + auto-vérification de la grammaire du type
// - FluxJetons: suite ordonnée + chaîne dont elle dérive
//
// Invariant : la plage d’un jeton a la longueur (en caractères) de sa valeur,
// et la concaténation des valeurs d’un flux redonne exactement son texte.

use std::fmt;

use super::erreurs::{Erreur, FormeIrrationnel, GenreErreur, Plage};

/// Opérateurs canoniques (un caractère chacun).
pub const OPERATEURS: &[char] = &['+', '-', '*', '/', '^', '%', '!', '√', '|', '°'];

/// Irrationnels natifs (après résolution des alias).
pub const IRRATIONNELS_NATIFS: &[char] = &['π', '𝑒'];

/// Préfixe réservé aux noms internes : interdit dans un irrationnel long.
pub const PREFIXE_RESERVE: &str = "__reserved";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeJeton {
    Entier,
    DecimalFini,
    DecimalInfini,
    Pourcentage,
    FractionMixte,
    IrrationnelNatif,
    IrrationnelCourt,
    IrrationnelLong,
    ParametreIrrationnel,
    Operateur,
    ParentheseGauche,
    ParentheseDroite,
    Fonction,
    Separateur,
    Inconnu,
}

impl fmt::Display for TypeJeton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TypeJeton::*;
        let s = match self {
            Entier => "entier",
            DecimalFini => "décimal fini",
            DecimalInfini => "décimal infini",
            Pourcentage => "pourcentage",
            FractionMixte => "fraction mixte",
            IrrationnelNatif => "irrationnel natif",
            IrrationnelCourt => "irrationnel court",
            IrrationnelLong => "irrationnel long",
            ParametreIrrationnel => "paramètre d’irrationnel",
            Operateur => "opérateur",
            ParentheseGauche => "parenthèse ouvrante",
            ParentheseDroite => "parenthèse fermante",
            Fonction => "fonction",
            Separateur => "séparateur",
            Inconnu => "inconnu",
        };
        f.write_str(s)
    }
}

/// Provenance d’un jeton : écrit par l’utilisateur ou inséré par une passe du lexique.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Origine {
    #[default]
    Source,
    /// `*` élidé (ex. `2x`) : lie plus fort que `*` et `/` explicites.
    MultiplicationImplicite,
    /// `/` d’un littéral fractionné (ex. `2.5` → `5/2`) : lu comme un seul nombre.
    BarreFraction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jeton {
    pub genre: TypeJeton,
    pub valeur: String,
    pub plage: Plage,
    pub valide: bool,
    pub origine: Origine,
}

impl Jeton {
    /// Construit un jeton à la position `debut` et vérifie sa grammaire.
    pub fn new(genre: TypeJeton, valeur: impl Into<String>, debut: usize) -> Self {
        let valeur = valeur.into();
        let n = valeur.chars().count();
        let valide = verifier(genre, &valeur);
        Self {
            genre,
            valeur,
            plage: Plage::new(debut, debut + n),
            valide,
            origine: Origine::Source,
        }
    }

    /// Jeton inséré par une passe (position recalculée à la reconstruction du flux).
    pub fn synthetique(genre: TypeJeton, valeur: impl Into<String>, origine: Origine) -> Self {
        let mut j = Self::new(genre, valeur, 0);
        j.origine = origine;
        j
    }

    pub fn est(&self, genre: TypeJeton, valeur: &str) -> bool {
        self.genre == genre && self.valeur == valeur
    }

    pub fn est_operateur(&self, op: char) -> bool {
        self.genre == TypeJeton::Operateur && self.valeur.chars().next() == Some(op)
    }

    pub fn est_nombre(&self) -> bool {
        matches!(
            self.genre,
            TypeJeton::Entier
                | TypeJeton::DecimalFini
                | TypeJeton::DecimalInfini
                | TypeJeton::Pourcentage
                | TypeJeton::FractionMixte
        )
    }

    pub fn est_irrationnel(&self) -> bool {
        matches!(
            self.genre,
            TypeJeton::IrrationnelNatif | TypeJeton::IrrationnelCourt | TypeJeton::IrrationnelLong
        )
    }

    /// Peut terminer une valeur (gauche d’une multiplication élidée).
    pub fn termine_valeur(&self) -> bool {
        self.est_nombre()
            || self.est_irrationnel()
            || matches!(
                self.genre,
                TypeJeton::ParametreIrrationnel | TypeJeton::ParentheseDroite
            )
            || self.est_operateur('!')
            || self.est_operateur('°')
    }

    /// Peut commencer une valeur (droite d’une multiplication élidée).
    pub fn commence_valeur(&self) -> bool {
        self.est_nombre()
            || self.est_irrationnel()
            || matches!(
                self.genre,
                TypeJeton::ParentheseGauche | TypeJeton::Fonction
            )
            || self.est_operateur('√')
    }

    /// Erreur typée correspondant à un jeton invalide.
    pub fn code_erreur(&self) -> GenreErreur {
        use TypeJeton::*;
        let contenu = self.valeur.clone();
        match self.genre {
            Entier | DecimalFini | DecimalInfini | Pourcentage | FractionMixte => {
                GenreErreur::Litteral {
                    sorte: self.genre,
                    contenu,
                }
            }
            IrrationnelNatif | IrrationnelCourt => GenreErreur::Irrationnel {
                forme: FormeIrrationnel::Court,
                contenu,
            },
            IrrationnelLong => {
                if contenu
                    .trim_start_matches('<')
                    .starts_with(PREFIXE_RESERVE)
                {
                    GenreErreur::MotReserve { contenu }
                } else {
                    GenreErreur::Irrationnel {
                        forme: FormeIrrationnel::Long,
                        contenu,
                    }
                }
            }
            ParametreIrrationnel => GenreErreur::Irrationnel {
                forme: FormeIrrationnel::Parametre,
                contenu,
            },
            Separateur => GenreErreur::Separateur {
                contenu: contenu.chars().next().unwrap_or(','),
            },
            Operateur | ParentheseGauche | ParentheseDroite | Fonction | Inconnu => {
                GenreErreur::JetonInconnu { contenu }
            }
        }
    }
}

/* ------------------------ Grammaires ------------------------ */

fn chiffres(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// `d.f` avec partie entière et partie décimale non vides.
fn decimal_fini(s: &str) -> bool {
    match s.split_once('.') {
        Some((d, f)) => chiffres(d) && chiffres(f),
        None => false,
    }
}

fn decimal_infini(s: &str) -> bool {
    // forme `d.f:r` (répétition explicite)
    if let Some((tete, rep)) = s.split_once(':') {
        return decimal_fini(tete) && chiffres(rep);
    }
    // forme `d.f...` (3 à 6 points)
    let tete = s.trim_end_matches('.');
    let points = s.chars().count() - tete.chars().count();
    (3..=6).contains(&points) && decimal_fini(tete)
}

fn pourcentage(s: &str) -> bool {
    match s.strip_suffix('%') {
        Some(n) => chiffres(n) || decimal_fini(n),
        None => false,
    }
}

/// `a_b/c` ou `a|b/c`.
/// `a_b/c`, `a_-b/c`, `a|b/c` (pas de signe après la barre).
fn fraction_mixte(s: &str) -> bool {
    let Some((a, reste)) = s.split_once(['_', '|']) else {
        return false;
    };
    let reste = if s.contains('_') {
        reste.strip_prefix(['+', '-']).unwrap_or(reste)
    } else {
        reste
    };
    match reste.split_once('/') {
        Some((b, c)) => chiffres(a) && chiffres(b) && chiffres(c),
        None => false,
    }
}

/// Caractères qui ne peuvent jamais désigner un irrationnel court.
pub fn caractere_reserve(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_whitespace()
        || OPERATEURS.contains(&c)
        || IRRATIONNELS_NATIFS.contains(&c)
        || "()[]{},;<>?.:_#@=".contains(c)
}

fn irrationnel_long(s: &str) -> bool {
    let Some(corps) = s.strip_prefix('<').and_then(|r| r.strip_suffix('>')) else {
        return false;
    };
    !corps.is_empty() && !corps.contains(['<', '>']) && !corps.starts_with(PREFIXE_RESERVE)
}

/// `?` précédé d’un signe et/ou d’un nombre (entier ou décimal).
fn parametre(s: &str) -> bool {
    let Some(corps) = s.strip_suffix('?') else {
        return false;
    };
    let nombre = corps.strip_prefix(['+', '-']).unwrap_or(corps);
    nombre.is_empty() || chiffres(nombre) || decimal_fini(nombre)
}

fn verifier(genre: TypeJeton, v: &str) -> bool {
    let mut cs = v.chars();
    let seul = match (cs.next(), cs.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    };
    match genre {
        TypeJeton::Entier => chiffres(v),
        TypeJeton::DecimalFini => decimal_fini(v),
        TypeJeton::DecimalInfini => decimal_infini(v),
        TypeJeton::Pourcentage => pourcentage(v),
        TypeJeton::FractionMixte => fraction_mixte(v),
        TypeJeton::IrrationnelNatif => seul.is_some_and(|c| IRRATIONNELS_NATIFS.contains(&c)),
        TypeJeton::IrrationnelCourt => seul.is_some_and(|c| !caractere_reserve(c)),
        TypeJeton::IrrationnelLong => irrationnel_long(v),
        TypeJeton::ParametreIrrationnel => parametre(v),
        TypeJeton::Operateur => seul.is_some_and(|c| OPERATEURS.contains(&c)),
        TypeJeton::ParentheseGauche => seul.is_some_and(|c| "([{".contains(c)),
        TypeJeton::ParentheseDroite => seul.is_some_and(|c| ")]}".contains(c)),
        TypeJeton::Fonction => !v.is_empty() && v.chars().all(|c| c.is_alphabetic()),
        TypeJeton::Separateur => seul.is_some_and(|c| c == ',' || c == ';'),
        TypeJeton::Inconnu => false,
    }
}

/* ------------------------ Flux ------------------------ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FluxJetons {
    pub jetons: Vec<Jeton>,
    pub texte: String,
}

impl FluxJetons {
    /// Recalcule le texte et des plages contiguës depuis 0.
    pub fn reconstruire(jetons: Vec<Jeton>) -> Self {
        let mut pos = 0usize;
        let mut texte = String::new();
        let jetons = jetons
            .into_iter()
            .map(|mut j| {
                let n = j.valeur.chars().count();
                j.plage = Plage::new(pos, pos + n);
                pos += n;
                texte.push_str(&j.valeur);
                j
            })
            .collect();
        Self { jetons, texte }
    }

    /// Premier jeton invalide → erreur typée (plage dans `self.texte`).
    pub fn verifier(&self) -> Result<(), Erreur> {
        match self.jetons.iter().find(|j| !j.valide) {
            Some(j) => Err(Erreur::new(j.code_erreur(), &self.texte, vec![j.plage])),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.jetons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jetons.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Jeton> {
        self.jetons.iter()
    }

    /// Texte couvert par une plage (plage en caractères).
    pub fn extrait(&self, plage: Plage) -> String {
        self.texte
            .chars()
            .skip(plage.debut)
            .take(plage.longueur())
            .collect()
    }
}

impl fmt::Display for FluxJetons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.texte)
    }
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_jetons(jetons: &[Jeton]) -> String {
    jetons
        .iter()
        .map(|j| match j.origine {
            Origine::Source => j.valeur.clone(),
            Origine::MultiplicationImplicite => "·".to_string(),
            Origine::BarreFraction => "⁄".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
