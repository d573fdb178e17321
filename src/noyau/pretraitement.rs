// src/noyau/pretraitement.rs
//
// Prétraitement
// -------------
// Étapes, dans l’ordre (chacune peut interrompre avec une erreur typée) :
// 1) commentaires : `@...` final, paires `#...#` libres
// 2) exposants typographiques : `x²³` -> `x^23`
// 3) alias de symboles (noms de fonctions + `<...>` protégés)
// 4) alias de fonctions (`<...>` protégé)
// 5) `=` final retiré (un seul, en fin d’expression)
// 6) formes redondantes : signes consécutifs, séparateurs de milliers,
//    séparateurs d’arguments unifiés en `,`
//
// Les erreurs de cette étape portent sur l’expression saisie (plages d’origine).

use log::debug;

use super::alias::{annoter, resoudre, texte_de, zones_protegees, Car};
use super::config::Tables;
use super::erreurs::{Erreur, GenreErreur, Plage};

/// Texte normalisé + carte vers l’expression d’origine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pretraitement {
    pub source: String,
    pub texte: String,
    /// `carte[i]` = plage d’origine du caractère normalisé `i`.
    pub carte: Vec<Plage>,
}

impl Pretraitement {
    fn depuis(source: &str, cars: &[Car]) -> Self {
        Self {
            source: source.to_string(),
            texte: texte_de(cars),
            carte: cars.iter().map(|k| k.origine).collect(),
        }
    }

    /// Ramène une plage du texte normalisé vers l’expression saisie.
    pub fn vers_origine(&self, plage: Plage) -> Plage {
        let fin_source = self.source.chars().count();
        if self.carte.is_empty() {
            return Plage::new(0, fin_source);
        }
        let dernier = self.carte.len() - 1;
        let a = self.carte[plage.debut.min(dernier)];
        let b = self.carte[plage.fin.saturating_sub(1).clamp(plage.debut.min(dernier), dernier)];
        a.union(b)
    }
}

fn erreur(genre: GenreErreur, source: &str, plages: Vec<Plage>) -> Erreur {
    Erreur::new(genre, source, plages)
}

/* ------------------------ 1) Commentaires ------------------------ */

fn retirer_commentaires(source: &str, cars: Vec<Car>) -> Result<Vec<Car>, Erreur> {
    // `@` : tout ce qui suit est un commentaire de fin
    let cars: Vec<Car> = match cars.iter().position(|k| k.c == '@') {
        Some(i) => cars[..i].to_vec(),
        None => cars,
    };

    let dieses: Vec<usize> = cars
        .iter()
        .enumerate()
        .filter(|(_, k)| k.c == '#')
        .map(|(i, _)| i)
        .collect();
    if dieses.len() % 2 != 0 {
        let orphelin = cars[dieses[dieses.len() - 1]].origine;
        return Err(erreur(GenreErreur::Commentaire, source, vec![orphelin]));
    }

    let mut dedans = false;
    let out: Vec<Car> = cars
        .into_iter()
        .filter(|k| {
            if k.c == '#' {
                dedans = !dedans;
                return false;
            }
            !dedans
        })
        .collect();

    Ok(rogner(out))
}

fn rogner(cars: Vec<Car>) -> Vec<Car> {
    let debut = cars.iter().position(|k| !k.c.is_whitespace());
    let fin = cars.iter().rposition(|k| !k.c.is_whitespace());
    match (debut, fin) {
        (Some(d), Some(f)) => cars[d..=f].to_vec(),
        _ => Vec::new(),
    }
}

/* ------------------------ 2) Exposants ------------------------ */

fn chiffre_exposant(c: char) -> Option<char> {
    let d = match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        _ => return None,
    };
    Some(d)
}

fn normaliser_exposants(cars: Vec<Car>) -> Vec<Car> {
    let mut out = Vec::with_capacity(cars.len());
    let mut dans_exposant = false;
    for k in cars {
        match chiffre_exposant(k.c) {
            Some(d) => {
                if !dans_exposant {
                    out.push(Car::new('^', k.origine));
                }
                out.push(Car::new(d, k.origine));
                dans_exposant = true;
            }
            None => {
                out.push(k);
                dans_exposant = false;
            }
        }
    }
    out
}

/* ------------------------ 5) Signe égal ------------------------ */

fn retirer_egal(source: &str, mut cars: Vec<Car>) -> Result<Vec<Car>, Erreur> {
    if cars.last().is_some_and(|k| k.c == '=') {
        cars.pop();
    }
    if let Some(k) = cars.iter().find(|k| k.c == '=') {
        return Err(erreur(GenreErreur::SigneEgal, source, vec![k.origine]));
    }
    Ok(cars)
}

/* ------------------------ 6) Formes redondantes ------------------------ */

fn reduire_signes(cars: Vec<Car>) -> Vec<Car> {
    let mut out: Vec<Car> = Vec::with_capacity(cars.len());
    let mut i = 0usize;
    while i < cars.len() {
        if matches!(cars[i].c, '+' | '-') {
            let debut = i;
            let mut moins = 0usize;
            while i < cars.len() && matches!(cars[i].c, '+' | '-') {
                if cars[i].c == '-' {
                    moins += 1;
                }
                i += 1;
            }
            let signe = if moins % 2 == 1 { '-' } else { '+' };
            let origine = cars[debut].origine.union(cars[i - 1].origine);
            out.push(Car::new(signe, origine));
        } else {
            out.push(cars[i]);
            i += 1;
        }
    }
    if out.first().is_some_and(|k| k.c == '+') {
        out.remove(0);
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Niveau {
    Fonction,
    Expression,
}

/// `,` de milliers : un entier avant (pas une partie décimale), exactement trois chiffres après.
fn separateur_de_milliers(cars: &[Car], i: usize) -> bool {
    let chiffre = |j: usize| cars.get(j).is_some_and(|k| k.c.is_ascii_digit());
    if i == 0 || !chiffre(i - 1) {
        return false;
    }
    let mut j = i - 1;
    while j > 0 && (chiffre(j - 1) || (cars[j - 1].c == ',' && chiffre(j.saturating_sub(2)))) {
        j -= 1;
    }
    if j > 0 && cars[j - 1].c == '.' {
        return false;
    }
    chiffre(i + 1) && chiffre(i + 2) && chiffre(i + 3) && !chiffre(i + 4)
}

fn separateurs(source: &str, cars: Vec<Car>, fonctions: &[String]) -> Result<Vec<Car>, Erreur> {
    let mut noms: Vec<Vec<char>> = fonctions.iter().map(|n| n.chars().collect()).collect();
    noms.sort_by_key(|n| std::cmp::Reverse(n.len()));

    let mut pile: Vec<Niveau> = Vec::new();
    let mut fautifs: Vec<Plage> = Vec::new();
    let mut out = Vec::with_capacity(cars.len());
    let mut apres_fonction = false;
    let mut i = 0usize;

    while i < cars.len() {
        let k = cars[i];

        if k.c == '<' {
            // irrationnel long : opaque
            let fin = cars[i..]
                .iter()
                .position(|x| x.c == '>')
                .map_or(cars.len(), |p| i + p + 1);
            out.extend_from_slice(&cars[i..fin]);
            i = fin;
            apres_fonction = false;
            continue;
        }

        if let Some(nom) = noms.iter().find(|n| {
            i + n.len() < cars.len()
                && cars[i..i + n.len()].iter().zip(n.iter()).all(|(a, b)| a.c == *b)
                && "([{".contains(cars[i + n.len()].c)
        }) {
            out.extend_from_slice(&cars[i..i + nom.len()]);
            i += nom.len();
            apres_fonction = true;
            continue;
        }

        match k.c {
            '(' | '[' | '{' => {
                pile.push(if apres_fonction {
                    Niveau::Fonction
                } else {
                    Niveau::Expression
                });
                out.push(k);
            }
            ')' | ']' | '}' => {
                pile.pop();
                out.push(k);
            }
            ',' | ';' => {
                if pile.last() == Some(&Niveau::Fonction) {
                    out.push(Car::new(',', k.origine));
                } else if k.c == ',' && separateur_de_milliers(&cars, i) {
                    // retiré
                } else {
                    fautifs.push(k.origine);
                }
            }
            _ => out.push(k),
        }
        apres_fonction = false;
        i += 1;
    }

    if let Some(premier) = fautifs.first() {
        let contenu = source.chars().nth(premier.debut).unwrap_or(',');
        return Err(erreur(GenreErreur::Separateur { contenu }, source, fautifs));
    }
    Ok(out)
}

/* ------------------------ Pipeline ------------------------ */

/// Normalise une expression saisie.
pub fn pretraiter(source: &str, tables: &Tables) -> Result<Pretraitement, Erreur> {
    let cars = annoter(source);
    let cars = retirer_commentaires(source, cars)?;
    let cars = normaliser_exposants(cars);

    let protections = zones_protegees(&cars, &tables.noms_proteges());
    let cars = resoudre(cars, &tables.symboles, protections);

    let protections = zones_protegees(&cars, &[]);
    let cars = resoudre(cars, &tables.fonctions, protections);

    let cars = retirer_egal(source, cars)?;
    let cars = reduire_signes(cars);
    let cars = separateurs(source, cars, &tables.noms_fonctions())?;

    let p = Pretraitement::depuis(source, &cars);
    debug!("prétraitement : {:?} -> {:?}", source, p.texte);
    Ok(p)
}
