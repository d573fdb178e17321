// src/lib.rs
//
// Calculatrice oloc : évaluation exacte d’expressions (rationnels, irrationnels
// symboliques, fonctions) avec démarche pas à pas et diagnostics localisés.

pub mod noyau;

pub use noyau::{
    calculer, calculer_avec_delai, Calculatrice, Erreur, ErreurConfig, GenreErreur, Options,
    Plage, Resultat, Tables, Valeur,
};
