//! Noyau exact (calculatrice oloc)
//!
//! Organisation interne :
//! - erreurs.rs        : plages, taxonomie d’erreurs, indices
//! - config.rs         : tables de correspondance + options (serde)
//! - jetons.rs         : jeton, types, flux
//! - alias.rs          : résolution des alias (zones protégées)
//! - pretraitement.rs  : commentaires, exposants, alias, signes, séparateurs
//! - lexique.rs        : balayage, multiplications implicites, fractions, parenthèses
//! - arbre.rs          : nœuds + paramètres
//! - syntaxe.rs        : analyse par priorités (placement, arité)
//! - canon.rs          : arithmétique entière/rationnelle, racines, forme canonique
//! - terme.rs          : valeurs exactes symboliques (somme de monômes)
//! - trig.rs           : angles spéciaux + réciproques
//! - fonctions.rs      : table des fonctions et règles exactes
//! - lecture.rs        : lecture décimale en virgule fixe
//! - format.rs         : affichage exact + rendu de la démarche
//! - eval.rs           : réduction pas à pas
//! - calcul.rs         : API (Calculatrice, Resultat, délai)

pub mod alias;
pub mod arbre;
pub mod calcul;
pub mod canon;
pub mod config;
pub mod erreurs;
pub mod eval;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod lecture;
pub mod lexique;
pub mod pretraitement;
pub mod syntaxe;
pub mod terme;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use calcul::{calculer, calculer_avec_delai, Calculatrice, Resultat};
pub use config::{Options, Tables};
pub use erreurs::{Erreur, ErreurConfig, GenreErreur, Plage};
pub use terme::Valeur;
