// src/noyau/erreurs.rs
//
// Système d’exceptions + positions (transversal)
// ---------------------------------------------
// - Plage : intervalle demi-ouvert [debut, fin) en indices de caractères
// - GenreErreur : taxonomie (un variant par famille, message via thiserror)
// - Erreur : genre + instantané de l’expression + plages fautives
//
// Le noyau ne rend rien à l’écran : il fournit les données (plages, indice,
// ligne de marqueurs) et l’appelant compose son diagnostic.

use std::fmt;

use thiserror::Error;

use super::jetons::TypeJeton;

/* ------------------------ Plage ------------------------ */

/// Intervalle demi-ouvert de positions (caractères) dans une expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Plage {
    pub debut: usize,
    pub fin: usize,
}

impl Plage {
    pub fn new(debut: usize, fin: usize) -> Self {
        Self { debut, fin }
    }

    /// Plage d’un seul caractère.
    pub fn point(pos: usize) -> Self {
        Self::new(pos, pos + 1)
    }

    pub fn longueur(&self) -> usize {
        self.fin.saturating_sub(self.debut)
    }

    pub fn est_vide(&self) -> bool {
        self.fin <= self.debut
    }

    /// Plus petite plage couvrant les deux.
    pub fn union(self, autre: Plage) -> Plage {
        Plage::new(self.debut.min(autre.debut), self.fin.max(autre.fin))
    }

    pub fn contient(&self, pos: usize) -> bool {
        self.debut <= pos && pos < self.fin
    }
}

impl fmt::Display for Plage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.debut, self.fin)
    }
}

/* ------------------------ Taxonomie ------------------------ */

/// Problème de parenthèses détecté par le lexique.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemeParenthese {
    GaucheOrpheline,
    DroiteOrpheline,
    Hierarchie,
}

/// Forme d’irrationnel fautive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormeIrrationnel {
    Court,
    Long,
    Parametre,
    ChevronGauche,
    ChevronDroit,
}

impl fmt::Display for FormeIrrationnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormeIrrationnel::Court => "irrationnel court",
            FormeIrrationnel::Long => "irrationnel long",
            FormeIrrationnel::Parametre => "paramètre d’irrationnel",
            FormeIrrationnel::ChevronGauche => "chevron `<` sans correspondance",
            FormeIrrationnel::ChevronDroit => "chevron `>` sans correspondance",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenreErreur {
    #[error("dièse `#` sans correspondance")]
    Commentaire,

    #[error("signe `=` mal placé")]
    SigneEgal,

    #[error("séparateur `{contenu}` invalide")]
    Separateur { contenu: char },

    #[error("parenthèse `{parenthese}` : {probleme:?}")]
    Parenthese {
        probleme: ProblemeParenthese,
        parenthese: char,
    },

    #[error("littéral invalide ({sorte}) `{contenu}`")]
    Litteral { sorte: TypeJeton, contenu: String },

    #[error("{forme} invalide `{contenu}`")]
    Irrationnel {
        forme: FormeIrrationnel,
        contenu: String,
    },

    #[error("le nom `{contenu}` est réservé")]
    MotReserve { contenu: String },

    #[error("jeton non reconnu `{contenu}`")]
    JetonInconnu { contenu: String },

    #[error("jeton mal placé `{contenu}`")]
    Placement { contenu: String },

    #[error("imbrication trop profonde (plus de {limite} niveaux)")]
    Profondeur { limite: usize },

    #[error("{fonction}() attend {attendu} argument(s), {recu} reçu(s)")]
    Arite {
        fonction: String,
        attendu: usize,
        recu: usize,
    },

    #[error("{fonction}() hors domaine : {raison}")]
    Domaine { fonction: String, raison: String },

    #[error("division par zéro dans `{unite}`")]
    DivisionParZero { unite: String },

    #[error("temps de calcul dépassé ({limite_ms} ms)")]
    Delai { limite_ms: u128 },

    #[error("aucune valeur de conversion pour l’irrationnel `{symbole}`")]
    Conversion { symbole: String },
}

impl GenreErreur {
    /// Indice de correction affiché sous le diagnostic.
    pub fn indice(&self) -> &'static str {
        use GenreErreur::*;
        match self {
            Commentaire => "Fermez le commentaire libre avec un second `#`.",
            SigneEgal => "Un seul `=` est permis, et seulement en fin d’expression.",
            Separateur { .. } => {
                "Séparateur de milliers : exactement trois chiffres après `,`. \
                 Les `,`/`;` d’arguments ne vont que dans un appel de fonction."
            }
            Parenthese { probleme, .. } => match probleme {
                ProblemeParenthese::Hierarchie => {
                    "Imbrication : ( dans [ dans { ; jamais un style plus grand dans un plus petit."
                }
                _ => "Vérifiez que chaque parenthèse ouverte est fermée par le même style.",
            },
            Litteral { .. } => {
                "Formes admises : 12, 1.5, 2.3..., 2.3:4, 50%, 1_1/2 (3 à 6 points pour un décimal infini)."
            }
            Irrationnel { forme, .. } => match forme {
                FormeIrrationnel::Parametre => {
                    "Paramètre : `?` précédé d’un signe et/ou d’un nombre, juste après un irrationnel."
                }
                FormeIrrationnel::ChevronGauche | FormeIrrationnel::ChevronDroit => {
                    "Un irrationnel long s’écrit <nom> ; vérifiez les chevrons."
                }
                _ => "Choisissez un symbole qui n’est ni un opérateur ni un caractère réservé.",
            },
            MotReserve { .. } => "Les noms commençant par `__reserved` sont réservés.",
            JetonInconnu { .. } => "Retirez ou remplacez le caractère non reconnu.",
            Placement { .. } => "Il manque probablement un opérande ou un opérateur à cet endroit.",
            Profondeur { .. } => {
                "Réduisez l’imbrication : parenthèses, appels et opérateurs unaires empilés."
            }
            Arite { .. } => "Vérifiez le nombre d’arguments de la fonction.",
            Domaine { .. } => "L’argument sort du domaine de définition de la fonction.",
            DivisionParZero { .. } => "Le diviseur s’évalue exactement à zéro.",
            Delai { .. } => "Simplifiez l’expression ou augmentez la limite de temps.",
            Conversion { .. } => {
                "Déclarez une valeur pour l’irrationnel, ex. x2.5? , pour obtenir une valeur concrète."
            }
        }
    }
}

/* ------------------------ Erreur ------------------------ */

/// Erreur du pipeline : genre + instantané de l’expression au moment de la détection.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{genre}")]
pub struct Erreur {
    pub genre: GenreErreur,
    pub expression: String,
    pub plages: Vec<Plage>,
}

impl Erreur {
    pub fn new(genre: GenreErreur, expression: impl Into<String>, plages: Vec<Plage>) -> Self {
        Self {
            genre,
            expression: expression.into(),
            plages,
        }
    }

    pub fn indice(&self) -> &'static str {
        self.genre.indice()
    }

    /// Rattache l’erreur à un autre instantané (plages déjà converties par l’appelant).
    pub fn avec_expression(mut self, expression: impl Into<String>, plages: Vec<Plage>) -> Self {
        self.expression = expression.into();
        self.plages = plages;
        self
    }

    /// Ligne de `^` sous les positions fautives (données de diagnostic).
    pub fn ligne_marqueur(&self) -> String {
        let n = self.expression.chars().count();
        let mut ligne = vec![' '; n];
        for p in &self.plages {
            for i in p.debut..p.fin.min(n) {
                ligne[i] = '^';
            }
        }
        let s: String = ligne.into_iter().collect();
        s.trim_end().to_string()
    }

    /// Texte couvert par la première plage (pratique pour les tests / l’appelant).
    pub fn extrait(&self) -> Option<String> {
        let p = self.plages.first()?;
        Some(self.expression.chars().skip(p.debut).take(p.longueur()).collect())
    }
}

/// Erreurs de configuration (tables injectées).
#[derive(Debug, Error)]
pub enum ErreurConfig {
    #[error("table de correspondance illisible : {0}")]
    Json(#[from] serde_json::Error),

    #[error("fonction canonique inconnue `{0}`")]
    FonctionInconnue(String),

    #[error("alias vide pour `{0}`")]
    AliasVide(String),
}
