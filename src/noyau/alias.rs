// src/noyau/alias.rs
//
// Résolution d’alias
// ------------------
// Applique une table ordonnée (canonique, [alias...]) : de haut en bas, puis de
// gauche à droite sur les alias. Les zones protégées (noms de fonctions,
// contenu de `<...>`) ne sont jamais substituées.
//
// On travaille sur des caractères annotés de leur plage d’origine : la carte
// vers l’expression saisie survit à chaque substitution.

use super::config::Correspondance;
use super::erreurs::Plage;

/// Caractère normalisé + plage qu’il couvre dans l’expression d’origine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Car {
    pub c: char,
    pub origine: Plage,
}

impl Car {
    pub fn new(c: char, origine: Plage) -> Self {
        Self { c, origine }
    }
}

/// Annote chaque caractère de `texte` par sa propre position.
pub fn annoter(texte: &str) -> Vec<Car> {
    texte
        .chars()
        .enumerate()
        .map(|(i, c)| Car::new(c, Plage::point(i)))
        .collect()
}

pub fn texte_de(cars: &[Car]) -> String {
    cars.iter().map(|k| k.c).collect()
}

fn correspond(cars: &[Car], pos: usize, motif: &[char]) -> bool {
    pos + motif.len() <= cars.len()
        && cars[pos..pos + motif.len()]
            .iter()
            .zip(motif)
            .all(|(k, m)| k.c == *m)
}

/// Positions protégées : toute occurrence d’un nom (plus long d’abord) et toute
/// zone `<...>` fermée (chevrons compris).
pub fn zones_protegees(cars: &[Car], noms: &[String]) -> Vec<bool> {
    let mut noms: Vec<Vec<char>> = noms
        .iter()
        .filter(|n| !n.is_empty())
        .map(|n| n.chars().collect())
        .collect();
    noms.sort_by_key(|n| std::cmp::Reverse(n.len()));

    let mut protege = vec![false; cars.len()];
    let mut i = 0usize;
    while i < cars.len() {
        if cars[i].c == '<' {
            if let Some(k) = cars[i + 1..].iter().position(|k| k.c == '>') {
                let fin = i + 1 + k;
                protege[i..=fin].iter_mut().for_each(|p| *p = true);
                i = fin + 1;
                continue;
            }
        }
        if let Some(nom) = noms.iter().find(|n| correspond(cars, i, n)) {
            protege[i..i + nom.len()].iter_mut().for_each(|p| *p = true);
            i += nom.len();
            continue;
        }
        i += 1;
    }
    protege
}

/// Balayage unique : à chaque position non protégée, le premier alias de la
/// table (ordre des entrées, puis plus long alias) qui correspond est remplacé
/// par sa forme canonique. Le texte produit n’est pas rebalayé.
pub fn resoudre(cars: Vec<Car>, table: &[Correspondance], protections: Vec<bool>) -> Vec<Car> {
    let table: Vec<(Vec<char>, Vec<Vec<char>>)> = table
        .iter()
        .map(|(canon, alias)| {
            let mut motifs: Vec<Vec<char>> = alias
                .iter()
                .filter(|a| !a.is_empty())
                .map(|a| a.chars().collect())
                .collect();
            // dans une même entrée, `factorial` avant `fact`
            motifs.sort_by_key(|m| std::cmp::Reverse(m.len()));
            (canon.chars().collect(), motifs)
        })
        .collect();

    let libre = |i: usize, n: usize| {
        (i..i + n).all(|k| !protections.get(k).copied().unwrap_or(false))
    };

    let mut out = Vec::with_capacity(cars.len());
    let mut i = 0usize;
    'balayage: while i < cars.len() {
        for (canon, alias) in &table {
            for motif in alias {
                if correspond(&cars, i, motif) && libre(i, motif.len()) {
                    let origine = cars[i].origine.union(cars[i + motif.len() - 1].origine);
                    out.extend(canon.iter().map(|&c| Car::new(c, origine)));
                    i += motif.len();
                    continue 'balayage;
                }
            }
        }
        out.push(cars[i]);
        i += 1;
    }
    out
}
