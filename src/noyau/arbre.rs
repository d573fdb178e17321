// src/noyau/arbre.rs
//
// Arbre sémantique
// ----------------
// Chaque nœud garde la plage (dans le texte du flux) des jetons qui l’ont produit.
// Les suites d’opérateurs de même priorité (`1+2-3+…`) forment une `Chaine` à
// plat, lue de gauche à droite : la profondeur ne croît qu’avec l’imbrication.
// `Noeud::Valeur` n’est jamais produit par l’analyse syntaxique : c’est la forme
// réduite qu’installe l’évaluateur à la place d’un sous-arbre.

use std::collections::VecDeque;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use super::erreurs::Plage;
use super::fonctions::Fonction;
use super::jetons::{Jeton, TypeJeton};
use super::lexique::rationnel_litteral;
use super::terme::{Symbole, Valeur};

/* ------------------------ Paramètres ------------------------ */

/// `?`, `+?`, `-?`, `2.5?`, `-3?`, `6?` après un irrationnel ou un groupe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parametre {
    pub signe: Option<i8>,
    pub nombre: Option<BigRational>,
    pub texte: String,
    pub plage: Plage,
}

impl Parametre {
    pub fn depuis_jeton(j: &Jeton) -> Option<Self> {
        let corps = j.valeur.strip_suffix('?')?;
        let (signe, nombre) = match corps.chars().next() {
            Some('+') => (Some(1), &corps[1..]),
            Some('-') => (Some(-1), &corps[1..]),
            _ => (None, corps),
        };
        let nombre = if nombre.is_empty() {
            None
        } else {
            let genre = if nombre.contains('.') {
                TypeJeton::DecimalFini
            } else {
                TypeJeton::Entier
            };
            Some(rationnel_litteral(&Jeton::new(genre, nombre, 0))?)
        };
        Some(Self {
            signe,
            nombre,
            texte: j.valeur.clone(),
            plage: j.plage,
        })
    }

    /// Entier non signé : nombre de décimales retenues.
    pub fn decimales(&self) -> Option<usize> {
        match (&self.signe, &self.nombre) {
            (None, Some(n)) if n.is_integer() => n.numer().to_usize(),
            _ => None,
        }
    }

    /// Valeur déclarée, signe appliqué.
    pub fn valeur_signee(&self) -> Option<BigRational> {
        let n = self.nombre.clone()?;
        Some(if self.signe == Some(-1) { -n } else { n })
    }
}

/* ------------------------ Nœuds ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Litteral {
    Fraction(BigRational),
    Irrationnel {
        symbole: Symbole,
        parametre: Option<Parametre>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Racine,
    Factorielle,
    Degre,
    Absolu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Plus,
    Moins,
    Fois,
    Divise,
    Puissance,
    Modulo,
}

impl OpBinaire {
    pub fn depuis_caractere(c: char) -> Option<Self> {
        Some(match c {
            '+' => OpBinaire::Plus,
            '-' => OpBinaire::Moins,
            '*' => OpBinaire::Fois,
            '/' => OpBinaire::Divise,
            '^' => OpBinaire::Puissance,
            '%' => OpBinaire::Modulo,
            _ => return None,
        })
    }

    pub fn symbole(self) -> char {
        match self {
            OpBinaire::Plus => '+',
            OpBinaire::Moins => '-',
            OpBinaire::Fois => '*',
            OpBinaire::Divise => '/',
            OpBinaire::Puissance => '^',
            OpBinaire::Modulo => '%',
        }
    }
}

/// Forme d’écriture d’un nœud binaire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Forme {
    Explicite,
    /// Multiplication élidée (`2x`).
    Juxtaposition,
    /// Signe préfixe : opérande gauche nul implicite (`-x` = `0 - x`).
    Signe,
}

/// Opérande d’une chaîne, avec l’opérateur qui le relie à ce qui précède.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maillon {
    pub op: OpBinaire,
    pub forme: Forme,
    pub noeud: Noeud,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Noeud {
    Litteral {
        litteral: Litteral,
        plage: Plage,
    },
    Unaire {
        op: OpUnaire,
        operande: Box<Noeud>,
        plage: Plage,
    },
    Binaire {
        op: OpBinaire,
        forme: Forme,
        gauche: Box<Noeud>,
        droite: Box<Noeud>,
        plage: Plage,
    },
    /// `((tete op a) op b)…` sans imbrication.
    Chaine {
        tete: Box<Noeud>,
        suite: VecDeque<Maillon>,
        plage: Plage,
    },
    Groupe {
        contenu: Box<Noeud>,
        parametre: Option<Parametre>,
        plage: Plage,
    },
    Appel {
        fonction: Fonction,
        args: Vec<Noeud>,
        plage: Plage,
    },
    Valeur {
        valeur: Valeur,
        plage: Plage,
    },
}

impl Noeud {
    pub fn plage(&self) -> Plage {
        match self {
            Noeud::Litteral { plage, .. }
            | Noeud::Unaire { plage, .. }
            | Noeud::Binaire { plage, .. }
            | Noeud::Chaine { plage, .. }
            | Noeud::Groupe { plage, .. }
            | Noeud::Appel { plage, .. }
            | Noeud::Valeur { plage, .. } => *plage,
        }
    }

    pub fn est_valeur(&self) -> bool {
        matches!(self, Noeud::Valeur { .. })
    }

    pub fn zero(plage: Plage) -> Noeud {
        Noeud::Litteral {
            litteral: Litteral::Fraction(BigRational::from_integer(BigInt::from(0))),
            plage,
        }
    }
}

/* ------------------------ Affichage (forme de débogage) ------------------------ */

impl fmt::Display for Litteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Litteral::Fraction(r) => write!(f, "{r}"),
            Litteral::Irrationnel { symbole, parametre } => {
                write!(f, "{symbole}")?;
                if let Some(p) = parametre {
                    write!(f, "{}", p.texte)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Noeud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Noeud::Litteral { litteral, .. } => write!(f, "{litteral}"),
            Noeud::Valeur { valeur, .. } => write!(f, "{valeur}"),
            Noeud::Unaire { op, operande, .. } => {
                let nom = match op {
                    OpUnaire::Racine => "√",
                    OpUnaire::Factorielle => "!",
                    OpUnaire::Degre => "°",
                    OpUnaire::Absolu => "abs",
                };
                write!(f, "({nom} {operande})")
            }
            Noeud::Binaire {
                op,
                forme,
                gauche,
                droite,
                ..
            } => match forme {
                Forme::Signe => {
                    let nom = if *op == OpBinaire::Moins { "neg" } else { "pos" };
                    write!(f, "({nom} {droite})")
                }
                Forme::Juxtaposition => write!(f, "(· {gauche} {droite})"),
                Forme::Explicite => write!(f, "({} {gauche} {droite})", op.symbole()),
            },
            Noeud::Chaine { tete, suite, .. } => {
                for m in suite.iter().rev() {
                    match m.forme {
                        Forme::Juxtaposition => write!(f, "(· ")?,
                        _ => write!(f, "({} ", m.op.symbole())?,
                    }
                }
                write!(f, "{tete}")?;
                for m in suite {
                    write!(f, " {})", m.noeud)?;
                }
                Ok(())
            }
            Noeud::Groupe {
                contenu, parametre, ..
            } => match parametre {
                Some(p) => write!(f, "(groupe {contenu} {})", p.texte),
                None => write!(f, "(groupe {contenu})"),
            },
            Noeud::Appel { fonction, args, .. } => {
                write!(f, "({fonction}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                write!(f, ")")
            }
        }
    }
}
